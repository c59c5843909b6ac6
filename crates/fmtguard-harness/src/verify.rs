//! Per-case verdicts and their roll-up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Verdict for one fixture case under one guard mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Fixture name, suffixed with ` [mode]` for cases that run in both modes.
    pub case_name: String,
    /// Standard clause the case exercises.
    pub section: String,
    pub mode: String,
    pub passed: bool,
    pub expected: String,
    /// Delivered text, or `error:<message>` when the call was rejected.
    pub actual: String,
    /// Return value of a successful print.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,
    pub diff: Option<String>,
}

/// Pass/fail tally for one guard mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTally {
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub by_mode: BTreeMap<String, ModeTally>,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let mut by_mode: BTreeMap<String, ModeTally> = BTreeMap::new();
        for r in &results {
            let tally = by_mode.entry(r.mode.clone()).or_default();
            if r.passed {
                tally.passed += 1;
            } else {
                tally.failed += 1;
            }
        }
        let failed = by_mode.values().map(|t| t.failed).sum();
        Self {
            total: results.len(),
            passed: results.len() - failed,
            failed,
            by_mode,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

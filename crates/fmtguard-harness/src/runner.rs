//! Test execution engine.

use std::time::Instant;

use fmtguard_core::{GuardMode, Sink, print_with_mode, strout};

use crate::diff;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, Outcome};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Guard mode the cases run under.
    pub mode: GuardMode,
}

/// What one guarded call produced.
struct CaseRun {
    actual: String,
    count: Option<i32>,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: GuardMode) -> Self {
        Self {
            campaign: campaign.into(),
            mode,
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        self.matching(fixture_set)
            .map(|case| self.verify(case, &execute_case(case, self.mode)))
            .collect()
    }

    /// [`run`](Self::run), emitting one `printf_case` entry per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::new();
        for case in self.matching(fixture_set) {
            let started = Instant::now();
            let run = execute_case(case, self.mode);
            let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let result = self.verify(case, &run);

            let outcome = if result.passed {
                Outcome::Pass
            } else {
                Outcome::Fail
            };
            log.emit(
                LogEntry::case(self.mode, result.case_name.as_str(), outcome)
                    .with_latency_ns(latency_ns)
                    .with_details(serde_json::json!({
                        "campaign": self.campaign,
                        "family": fixture_set.family,
                        "format": case.format,
                        "expected": result.expected,
                        "actual": result.actual,
                        "count": result.count,
                    })),
            )?;
            results.push(result);
        }
        Ok(results)
    }

    fn matching<'a>(&self, set: &'a FixtureSet) -> impl Iterator<Item = &'a FixtureCase> {
        let mode = self.mode;
        set.cases
            .iter()
            .filter(move |case| mode_matches(mode, &case.mode))
    }

    fn verify(&self, case: &FixtureCase, run: &CaseRun) -> VerificationResult {
        // Cases with mode=both run once per mode; tag the name so reports stay unique.
        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode.as_str())
        } else {
            case.name.clone()
        };

        let mut notes = Vec::new();
        if let Some(expected) = case.expected_count
            && run.count != Some(expected)
        {
            notes.push(format!(
                "count mismatch: expected={expected}, actual={}",
                run.count
                    .map_or_else(|| String::from("none"), |n| n.to_string())
            ));
        }
        let text_matches = run.actual == case.expected_output;

        let diff = if !text_matches {
            let mut d = diff::render_diff(&case.expected_output, &run.actual);
            for note in &notes {
                d.push('\n');
                d.push_str(note);
            }
            Some(d)
        } else if !notes.is_empty() {
            Some(notes.join("\n"))
        } else {
            None
        };

        VerificationResult {
            case_name,
            section: case.section.clone(),
            mode: self.mode.as_str().to_string(),
            passed: text_matches && notes.is_empty(),
            expected: case.expected_output.clone(),
            actual: run.actual.clone(),
            count: run.count,
            diff,
        }
    }
}

fn mode_matches(active: GuardMode, case_mode: &str) -> bool {
    case_mode.eq_ignore_ascii_case("both") || case_mode.eq_ignore_ascii_case(active.as_str())
}

fn execute_case(case: &FixtureCase, mode: GuardMode) -> CaseRun {
    let args = case.call_args();
    let mut text = String::new();
    let result = {
        let mut out = strout(&mut text);
        print_with_mode(mode, Sink::callable(&mut out), &case.format, &args)
    };
    match result {
        Ok(n) => CaseRun {
            actual: text,
            count: Some(n),
        },
        Err(err) => CaseRun {
            actual: format!("error:{err}"),
            count: None,
        },
    }
}

//! Markdown and JSON renderings of a verification run.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    /// Modes exercised, e.g. `strict+off`.
    pub mode: String,
    pub timestamp: String,
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut md = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(md, "# {}\n", self.title);
        let _ = writeln!(md, "Generated {} over modes `{}`.\n", self.timestamp, self.mode);
        let _ = writeln!(
            md,
            "**{} of {} cases passed** ({} failed)\n",
            s.passed, s.total, s.failed
        );

        if !s.by_mode.is_empty() {
            md.push_str("| Mode | Passed | Failed |\n|---|---|---|\n");
            for (mode, tally) in &s.by_mode {
                let _ = writeln!(md, "| {mode} | {} | {} |", tally.passed, tally.failed);
            }
            md.push('\n');
        }

        md.push_str("| Case | Mode | Section | Status |\n|---|---|---|---|\n");
        for r in &s.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(md, "| {} | {} | {} | {status} |", r.case_name, r.mode, r.section);
        }

        let mut failures = s.failures().peekable();
        if failures.peek().is_some() {
            md.push_str("\n## Failures\n");
            for r in failures {
                let diff = r.diff.as_deref().unwrap_or("(no diff)");
                let _ = write!(md, "\n### {}\n\n```\n{diff}\n```\n", r.case_name);
            }
        }
        md
    }

    /// Pretty JSON. Falls back to an `{"error": ...}` object.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn report(passed: bool) -> ConformanceReport {
        let result = VerificationResult {
            case_name: "percent_escape".into(),
            section: "C11 7.21.6.1p8".into(),
            mode: "strict".into(),
            passed,
            expected: "%d".into(),
            actual: if passed { "%d" } else { "%" }.into(),
            count: Some(2),
            diff: (!passed).then(|| "--- expected\n+++ actual\n".to_string()),
        };
        ConformanceReport {
            title: "fmtguard Conformance Report".into(),
            mode: "strict".into(),
            timestamp: "2026-10-16T00:00:00.000Z".into(),
            summary: VerificationSummary::from_results(vec![result]),
        }
    }

    #[test]
    fn markdown_lists_cases_and_modes() {
        let md = report(true).to_markdown();
        assert!(md.starts_with("# fmtguard Conformance Report\n"));
        assert!(md.contains("**1 of 1 cases passed** (0 failed)"));
        assert!(md.contains("| strict | 1 | 0 |"));
        assert!(md.contains("| percent_escape | strict | C11 7.21.6.1p8 | PASS |"));
        assert!(!md.contains("## Failures"));
    }

    #[test]
    fn markdown_includes_failure_diffs() {
        let md = report(false).to_markdown();
        assert!(md.contains("| FAIL |"));
        assert!(md.contains("### percent_escape"));
        assert!(md.contains("+++ actual"));
    }

    #[test]
    fn json_roundtrips() {
        let back: ConformanceReport = serde_json::from_str(&report(true).to_json()).unwrap();
        assert_eq!(back.summary.total, 1);
        assert_eq!(back.summary.results[0].count, Some(2));
        assert_eq!(back.summary.by_mode["strict"].passed, 1);
    }
}

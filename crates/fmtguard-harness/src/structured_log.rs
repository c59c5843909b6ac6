//! JSONL run logs.
//!
//! One [`LogEntry`] per line. Every line carries `timestamp`, `trace_id`,
//! `level` and `event`; `printf_case` lines also name the case and its
//! outcome. [`LogEmitter`] stamps trace ids as `<run_id>::<campaign>::<seq>`,
//! [`validate_log_file`] checks a finished log against that contract, and
//! [`ArtifactIndex`] records SHA-256 digests of the files a run wrote.

use std::io::{self, Write};
use std::path::Path;

use fmtguard_core::GuardMode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Event name for one fixture case under one mode.
pub const CASE_EVENT: &str = "printf_case";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
}

/// One log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    /// Left empty until an emitter stamps it.
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Fixture case name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ns: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl LogEntry {
    /// A run-level event such as `run_start`.
    #[must_use]
    pub fn event(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: String::new(),
            level,
            event: event.into(),
            mode: None,
            case: None,
            outcome: None,
            latency_ns: None,
            duration_ms: None,
            details: None,
        }
    }

    /// A `printf_case` entry. Failures are logged at error level.
    #[must_use]
    pub fn case(mode: GuardMode, name: impl Into<String>, outcome: Outcome) -> Self {
        let level = match outcome {
            Outcome::Fail => LogLevel::Error,
            Outcome::Pass | Outcome::Skip => LogLevel::Info,
        };
        Self {
            mode: Some(mode.as_str().to_string()),
            case: Some(name.into()),
            outcome: Some(outcome),
            ..Self::event(level, CASE_EVENT)
        }
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    #[must_use]
    pub fn with_latency_ns(mut self, ns: u64) -> Self {
        self.latency_ns = Some(ns);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The entry as one JSON line, without the newline.
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Appends entries to a JSONL stream, numbering them as it goes.
pub struct LogEmitter {
    out: Box<dyn Write>,
    run_id: String,
    campaign: String,
    emitted: u64,
}

impl LogEmitter {
    pub fn to_file(path: &Path, run_id: &str, campaign: &str) -> io::Result<Self> {
        let file = io::BufWriter::new(std::fs::File::create(path)?);
        Ok(Self::with_writer(Box::new(file), run_id, campaign))
    }

    /// An emitter whose lines go nowhere.
    #[must_use]
    pub fn discard(run_id: &str, campaign: &str) -> Self {
        Self::with_writer(Box::new(io::sink()), run_id, campaign)
    }

    #[must_use]
    pub fn with_writer(out: Box<dyn Write>, run_id: &str, campaign: &str) -> Self {
        Self {
            out,
            run_id: run_id.to_owned(),
            campaign: campaign.to_owned(),
            emitted: 0,
        }
    }

    /// Write `entry`, stamping a trace id if it has none. Returns the id used.
    pub fn emit(&mut self, mut entry: LogEntry) -> io::Result<String> {
        self.emitted += 1;
        if entry.trace_id.is_empty() {
            entry.trace_id = format!("{}::{}::{:03}", self.run_id, self.campaign, self.emitted);
        }
        let line = entry.to_jsonl().map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        Ok(entry.trace_id)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A contract violation on one log line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {field}: {problem}")]
pub struct LogViolation {
    pub line: usize,
    pub field: &'static str,
    pub problem: String,
}

/// Result of checking a whole log file.
#[derive(Debug, Default)]
pub struct LogReport {
    /// Non-blank lines seen.
    pub entries: usize,
    pub violations: Vec<LogViolation>,
}

impl LogReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check one line. `line` is 1-based and only used in the violations.
pub fn validate_log_line(text: &str, line: usize) -> Result<LogEntry, Vec<LogViolation>> {
    let violation = |field: &'static str, problem: String| LogViolation {
        line,
        field,
        problem,
    };

    let value: Value =
        serde_json::from_str(text).map_err(|e| vec![violation("<json>", e.to_string())])?;
    let Some(obj) = value.as_object() else {
        return Err(vec![violation("<root>", "not a JSON object".into())]);
    };

    let violations: Vec<_> = field_problems(obj)
        .into_iter()
        .map(|(field, problem)| violation(field, problem))
        .collect();
    if !violations.is_empty() {
        return Err(violations);
    }
    serde_json::from_value(value).map_err(|e| vec![violation("<entry>", e.to_string())])
}

fn field_problems(obj: &Map<String, Value>) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            problems.push((field, "missing".to_string()));
        }
    }

    if let Some(level) = obj.get("level")
        && serde_json::from_value::<LogLevel>(level.clone()).is_err()
    {
        problems.push(("level", format!("unknown level {level}")));
    }
    if let Some(outcome) = obj.get("outcome")
        && serde_json::from_value::<Outcome>(outcome.clone()).is_err()
    {
        problems.push(("outcome", format!("unknown outcome {outcome}")));
    }
    if let Some(mode) = obj.get("mode") {
        let known = [GuardMode::Strict, GuardMode::Off]
            .iter()
            .any(|m| mode.as_str() == Some(m.as_str()));
        if !known {
            problems.push(("mode", format!("unknown mode {mode}")));
        }
    }

    if let Some(id) = obj.get("trace_id").and_then(Value::as_str)
        && id.split("::").count() != 3
    {
        problems.push(("trace_id", format!("'{id}' is not <run_id>::<campaign>::<seq>")));
    }

    if obj.get("event").and_then(Value::as_str) == Some(CASE_EVENT) {
        if !obj.get("case").is_some_and(Value::is_string) {
            problems.push(("case", "case events must name the case".to_string()));
        }
        if !obj.contains_key("outcome") {
            problems.push(("outcome", "case events must carry an outcome".to_string()));
        }
    }
    problems
}

/// Check every non-blank line of a JSONL file.
pub fn validate_log_file(path: &Path) -> io::Result<LogReport> {
    let text = std::fs::read_to_string(path)?;
    let mut report = LogReport::default();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.entries += 1;
        if let Err(found) = validate_log_line(line, idx + 1) {
            report.violations.extend(found);
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Artifact index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub path: String,
    /// What the file is, e.g. `log` or `report_md`.
    pub kind: String,
    pub sha256: String,
    pub size_bytes: u64,
}

/// The files one run produced, with their digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub artifacts: Vec<ArtifactEntry>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            version: 1,
            run_id: run_id.into(),
            generated_at: now_utc(),
            artifacts: Vec::new(),
        }
    }

    /// Record `data` under `path` without touching the filesystem.
    pub fn add_bytes(&mut self, path: impl Into<String>, kind: impl Into<String>, data: &[u8]) {
        self.artifacts.push(ArtifactEntry {
            path: path.into(),
            kind: kind.into(),
            sha256: sha256_hex(data),
            size_bytes: data.len() as u64,
        });
    }

    /// Read and record a file.
    pub fn add_file(&mut self, path: &Path, kind: impl Into<String>) -> io::Result<()> {
        let data = std::fs::read(path)?;
        self.add_bytes(path.display().to_string(), kind, &data);
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Lowercase hex SHA-256 of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Wall-clock time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(since_epoch.as_secs(), since_epoch.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (y, m, d) = date_from_days(days as i64);
    let (hh, mm, ss) = (rem / 3600, rem % 3600 / 60, rem % 60);
    format!("{y:04}-{m:02}-{d:02}T{hh:02}:{mm:02}:{ss:02}.{millis:03}Z")
}

/// Gregorian date for a count of days since 1970-01-01.
fn date_from_days(days: i64) -> (i64, u32, u32) {
    // Shift the epoch to 0000-03-01 so leap days fall at the end of a year.
    let shifted = days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let march_month = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * march_month + 2) / 5 + 1) as u32;
    let month = if march_month < 10 {
        march_month + 3
    } else {
        march_month - 9
    } as u32;
    (year_of_era + era * 400 + i64::from(month <= 2), month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(entry: &LogEntry) -> Value {
        serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap()
    }

    #[test]
    fn run_event_omits_case_fields() {
        let json = parse(&LogEntry::event(LogLevel::Info, "run_start").with_trace_id("r::c::001"));
        assert_eq!(json["level"], "info");
        assert_eq!(json["event"], "run_start");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
        for absent in ["mode", "case", "outcome", "details"] {
            assert!(json.get(absent).is_none(), "{absent}");
        }
    }

    #[test]
    fn failed_case_logs_at_error_level() {
        let entry = LogEntry::case(GuardMode::Strict, "int_for_str", Outcome::Fail)
            .with_latency_ns(1500)
            .with_details(serde_json::json!({"format": "%s"}));
        let json = parse(&entry);
        assert_eq!(json["level"], "error");
        assert_eq!(json["event"], CASE_EVENT);
        assert_eq!(json["mode"], "strict");
        assert_eq!(json["case"], "int_for_str");
        assert_eq!(json["outcome"], "fail");
        assert_eq!(json["latency_ns"], 1500);
        assert_eq!(json["details"]["format"], "%s");

        let passed = LogEntry::case(GuardMode::Off, "x", Outcome::Pass);
        assert_eq!(passed.level, LogLevel::Info);
    }

    #[test]
    fn emitter_numbers_entries() {
        let mut log = LogEmitter::discard("run-42", "verify");
        let first = log.emit(LogEntry::event(LogLevel::Info, "run_start")).unwrap();
        let kept = log
            .emit(LogEntry::event(LogLevel::Info, "note").with_trace_id("a::b::c"))
            .unwrap();
        let third = log.emit(LogEntry::event(LogLevel::Info, "run_end")).unwrap();
        assert_eq!(first, "run-42::verify::001");
        assert_eq!(kept, "a::b::c");
        assert_eq!(third, "run-42::verify::003");
    }

    #[test]
    fn emitted_lines_validate() {
        let case = LogEntry::case(GuardMode::Off, "x", Outcome::Skip).with_trace_id("r::c::002");
        let back = validate_log_line(&case.to_jsonl().unwrap(), 2).unwrap();
        assert_eq!(back.case.as_deref(), Some("x"));
        assert_eq!(back.outcome, Some(Outcome::Skip));
    }

    #[test]
    fn missing_required_fields() {
        let errors = validate_log_line(r#"{"level":"info"}"#, 4).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["timestamp", "trace_id", "event"]);
        assert!(errors.iter().all(|v| v.line == 4));
    }

    #[test]
    fn unknown_enum_values() {
        let line = r#"{"timestamp":"t","trace_id":"a::b::c","level":"critical","event":"e","mode":"hardened","outcome":"maybe"}"#;
        let errors = validate_log_line(line, 1).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["level", "outcome", "mode"]);
        assert_eq!(errors[0].to_string(), r#"line 1: level: unknown level "critical""#);
    }

    #[test]
    fn case_event_needs_name_and_outcome() {
        let line = r#"{"timestamp":"t","trace_id":"a::b::c","level":"info","event":"printf_case"}"#;
        let fields: Vec<_> = validate_log_line(line, 1)
            .unwrap_err()
            .iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, ["case", "outcome"]);
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(validate_log_line("{", 1).unwrap_err()[0].field, "<json>");
        assert_eq!(validate_log_line("[1]", 1).unwrap_err()[0].field, "<root>");
        let flat = r#"{"timestamp":"t","trace_id":"flat","level":"info","event":"e"}"#;
        assert_eq!(validate_log_line(flat, 1).unwrap_err()[0].field, "trace_id");
    }

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn index_records_digest_and_size() {
        let mut index = ArtifactIndex::new("run-1");
        index.add_bytes("out/log.jsonl", "log", b"abc");
        let json: Value = serde_json::from_str(&index.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["artifacts"][0]["size_bytes"], 3);
        assert_eq!(json["artifacts"][0]["sha256"], sha256_hex(b"abc"));
    }

    #[test]
    fn utc_formatting() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_utc(1_709_210_096, 7), "2024-02-29T12:34:56.007Z");
        assert_eq!(format_utc(951_782_400, 0), "2000-02-29T00:00:00.000Z");
    }
}

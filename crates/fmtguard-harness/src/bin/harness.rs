//! CLI entrypoint for the fmtguard verification harness.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use fmtguard_core::{GuardMode, Sink, print_with_mode};
use fmtguard_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, validate_log_file,
};
use fmtguard_harness::{
    ConformanceReport, FixtureArg, FixtureSet, TestRunner, VerificationResult, VerificationSummary,
};

/// Verification tooling for fmtguard.
#[derive(Debug, Parser)]
#[command(name = "fmtguard-harness")]
#[command(about = "Fixture-driven verification harness for fmtguard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the guard against fixture files.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown). A JSON report is written alongside.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path. An artifact index is written alongside.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Run one guarded call and print the result.
    Check {
        /// printf format string.
        #[arg(long)]
        format: String,
        /// Typed argument as `tag=value` (e.g. `int=5`, `str=hi`, `null`).
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Guard mode (`strict` or `off`).
        #[arg(long, default_value = "strict")]
        mode: String,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// Log file path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
            timestamp,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let fixture_sets = FixtureSet::load_dir(&fixture)?;
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let started = Instant::now();
            let mut results = match &log {
                Some(path) => run_logged(&fixture_sets, path)?,
                None => run_all(&fixture_sets),
            };
            let elapsed_ms = started.elapsed().as_millis();

            // Stabilize report ordering for reproducible output.
            results.sort_by(|a, b| {
                a.mode
                    .cmp(&b.mode)
                    .then_with(|| a.section.cmp(&b.section))
                    .then_with(|| a.case_name.cmp(&b.case_name))
            });

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("fmtguard Conformance Report"),
                mode: String::from("strict+off"),
                timestamp: timestamp
                    .unwrap_or_else(fmtguard_harness::structured_log::now_utc),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={} ({elapsed_ms} ms)",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(report_path) = &report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(report_path, report_doc.to_markdown())?;
                std::fs::write(report_path.with_extension("json"), report_doc.to_json())?;
            }

            if let Some(log_path) = &log {
                let index_path = write_artifact_index(log_path, report.as_deref())?;
                eprintln!("Wrote artifact index to {}", index_path.display());
            }

            if !report_doc.summary.all_passed() {
                for failure in report_doc.summary.failures() {
                    eprintln!("FAIL {} [{}]", failure.case_name, failure.mode);
                }
                return Err("Conformance verification failed".into());
            }
        }
        Command::Check { format, args, mode } => {
            let fixture_args = args
                .iter()
                .map(|spec| FixtureArg::parse_cli(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let call_args: Vec<_> = fixture_args.iter().map(FixtureArg::to_arg).collect();
            let mode = GuardMode::from_str_loose(&mode);

            let mut out = std::io::stdout();
            match print_with_mode(mode, Sink::appendable(&mut out), &format, &call_args) {
                Ok(n) => eprintln!("\n[{}] returned {n}", mode.as_str()),
                Err(err) => {
                    eprintln!("[{}] {err}", mode.as_str());
                    return Err(err.into());
                }
            }
        }
        Command::ValidateLog { log } => {
            let checked = validate_log_file(&log)?;
            if checked.is_clean() {
                eprintln!("{}: {} entries, all valid", log.display(), checked.entries);
            } else {
                for violation in &checked.violations {
                    eprintln!("{violation}");
                }
                return Err(format!(
                    "{}: {} violation(s) in {} entries",
                    log.display(),
                    checked.violations.len(),
                    checked.entries
                )
                .into());
            }
        }
    }

    Ok(())
}

fn runners() -> [TestRunner; 2] {
    [
        TestRunner::new("fixture-verify", GuardMode::Strict),
        TestRunner::new("fixture-verify", GuardMode::Off),
    ]
}

fn run_all(sets: &[FixtureSet]) -> Vec<VerificationResult> {
    let mut results = Vec::new();
    for runner in runners() {
        for set in sets {
            results.extend(runner.run(set));
        }
    }
    results
}

fn run_logged(
    sets: &[FixtureSet],
    log_path: &Path,
) -> Result<Vec<VerificationResult>, Box<dyn std::error::Error>> {
    let run_id = run_id();
    let mut log = LogEmitter::to_file(log_path, &run_id, "fixture-verify")?;
    let started = Instant::now();
    log.emit(
        LogEntry::event(LogLevel::Info, "run_start").with_details(serde_json::json!({
            "fixture_sets": sets.iter().map(|s| s.family.as_str()).collect::<Vec<_>>(),
        })),
    )?;

    let mut results = Vec::new();
    for runner in runners() {
        for set in sets {
            results.extend(runner.run_logged(set, &mut log)?);
        }
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    let level = if failed == 0 {
        LogLevel::Info
    } else {
        LogLevel::Warn
    };
    log.emit(
        LogEntry::event(level, "run_end")
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_details(serde_json::json!({
                "total": results.len(),
                "failed": failed,
            })),
    )?;
    log.flush()?;
    Ok(results)
}

fn write_artifact_index(
    log_path: &Path,
    report: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut index = ArtifactIndex::new(run_id());
    index.add_file(log_path, "log")?;
    if let Some(report) = report {
        index.add_file(report, "report_md")?;
        index.add_file(&report.with_extension("json"), "report_json")?;
    }
    let index_path = log_path.with_extension("index.json");
    std::fs::write(&index_path, index.to_json()?)?;
    Ok(index_path)
}

fn run_id() -> String {
    format!("fmtguard-{}", std::process::id())
}

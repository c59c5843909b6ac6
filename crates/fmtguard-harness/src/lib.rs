//! Fixture-driven verification for fmtguard.
//!
//! Fixture files pair a format string and typed arguments with the text the
//! guarded call must deliver, or the diagnostic it must fail with. The
//! [`TestRunner`] replays them under each [`fmtguard_core::GuardMode`],
//! [`ConformanceReport`] renders the verdicts, and [`structured_log`] keeps a
//! JSONL trail of the run.

#![forbid(unsafe_code)]

pub mod diff;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use fixtures::{FixtureArg, FixtureCase, FixtureError, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{ModeTally, VerificationResult, VerificationSummary};

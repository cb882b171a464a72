//! Replay harness for the positioner guard.
//!
//! This crate provides:
//! - Fixtures: scripted request streams with the expected guard outcome per request
//! - Replay: an in-memory host that runs those streams through the real interceptor
//! - Verify: transcript comparison and diffs
//! - Report generation: markdown + JSON reports and JSONL structured logs

#![forbid(unsafe_code)]

pub mod diff;
pub mod fixtures;
pub mod replay;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use fixtures::{FixtureCase, FixtureError, FixtureSet};
pub use report::ReplayReport;
pub use runner::TestRunner;
pub use verify::VerificationResult;

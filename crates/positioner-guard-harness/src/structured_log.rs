//! JSONL log records for replay runs.
//!
//! One line per case and per step, so a failing replay can be joined back to
//! the exact request that diverged.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::verify::{StepRecord, VerificationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
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
}

impl Outcome {
    #[must_use]
    pub const fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            mode: None,
            case: None,
            step: None,
            outcome: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_case(mut self, mode: impl Into<String>, case: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self.case = Some(case.into());
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Writes [`LogEntry`] lines with sequential trace ids.
pub struct LogEmitter<W: Write> {
    writer: W,
    seq: u64,
    run_id: String,
}

impl LogEmitter<std::io::BufWriter<std::fs::File>> {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file), run_id))
    }
}

impl<W: Write> LogEmitter<W> {
    #[must_use]
    pub fn new(writer: W, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{:04}", self.run_id, self.seq)
    }

    /// Emit a log entry, assigning a trace id if it has none.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Emit one `case_result` entry followed by a `step` entry per request.
    pub fn emit_result(&mut self, result: &VerificationResult) -> std::io::Result<()> {
        let level = if result.passed {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let details = serde_json::json!({
            "family": result.family,
            "metrics": result.metrics,
            "diff": result.diff,
        });
        self.emit_entry(
            LogEntry::new("", level, "case_result")
                .with_case(&result.mode, &result.case_name)
                .with_outcome(Outcome::from_passed(result.passed))
                .with_details(details),
        )?;
        for step in &result.steps {
            self.emit_entry(step_entry(result, step))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn step_entry(result: &VerificationResult, step: &StepRecord) -> LogEntry {
    let level = if step.passed() {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    LogEntry::new("", level, "step")
        .with_case(&result.mode, &result.case_name)
        .with_step(step.index)
        .with_outcome(Outcome::from_passed(step.passed()))
        .with_details(serde_json::json!({
            "target": step.target,
            "interface": step.interface,
            "opcode": step.opcode,
            "expected": step.expected,
            "actual": step.actual,
            "events": step.events_actual,
        }))
}

fn now_utc() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

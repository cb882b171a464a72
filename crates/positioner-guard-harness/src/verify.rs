//! Outcome comparison and verification.

use positioner_guard_membrane::MetricsSnapshot;
use serde::{Deserialize, Serialize};

use crate::fixtures::{FixtureEvent, StepOutcome};

/// Expected and observed effect of one scripted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub target: String,
    pub interface: Option<String>,
    pub opcode: u32,
    pub expected: StepOutcome,
    pub actual: StepOutcome,
    pub events_expected: Vec<FixtureEvent>,
    pub events_actual: Vec<FixtureEvent>,
}

impl StepRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expected == self.actual && self.events_expected == self.events_actual
    }

    fn header(&self) -> String {
        format!(
            "#{} {}({}).{}",
            self.index,
            self.target,
            self.interface.as_deref().unwrap_or("?"),
            self.opcode
        )
    }
}

fn transcript_lines(
    steps: &[StepRecord],
    pick: impl Fn(&StepRecord) -> (&[FixtureEvent], StepOutcome),
) -> String {
    let mut out = String::new();
    for step in steps {
        let (events, outcome) = pick(step);
        for event in events {
            out.push_str(&format!(
                "   <- repositioned {} token={}\n",
                event.popup, event.token
            ));
        }
        out.push_str(&format!("{} -> {}\n", step.header(), outcome.as_str()));
    }
    out
}

/// Transcript of what the fixture expects.
#[must_use]
pub fn expected_transcript(steps: &[StepRecord]) -> String {
    transcript_lines(steps, |s| (s.events_expected.as_slice(), s.expected))
}

/// Transcript of what the guard actually did.
#[must_use]
pub fn actual_transcript(steps: &[StepRecord]) -> String {
    transcript_lines(steps, |s| (s.events_actual.as_slice(), s.actual))
}

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the test case.
    pub case_name: String,
    pub family: String,
    /// Guard mode the case ran under.
    pub mode: String,
    /// Whether the case passed.
    pub passed: bool,
    /// Expected transcript.
    pub expected: String,
    /// Actual transcript.
    pub actual: String,
    /// Diff if the case failed.
    pub diff: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    /// Counters at the end of the case; absent if the case could not run.
    pub metrics: Option<MetricsSnapshot>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(expected: StepOutcome, actual: StepOutcome, events: Vec<FixtureEvent>) -> StepRecord {
        StepRecord {
            index: 2,
            target: String::from("surface"),
            interface: Some(String::from("wl_surface")),
            opcode: 6,
            expected,
            actual,
            events_expected: events.clone(),
            events_actual: events,
        }
    }

    #[test]
    fn transcript_lists_events_before_the_request() {
        let events = vec![FixtureEvent {
            popup: String::from("popup"),
            token: 7,
        }];
        let steps = [step(StepOutcome::Forwarded, StepOutcome::Forwarded, events)];
        assert_eq!(
            actual_transcript(&steps),
            "   <- repositioned popup token=7\n#2 surface(wl_surface).6 -> forwarded\n"
        );
        assert_eq!(expected_transcript(&steps), actual_transcript(&steps));
        assert!(steps[0].passed());
    }

    #[test]
    fn outcome_mismatch_fails_the_step() {
        let s = step(StepOutcome::Suppressed, StepOutcome::Forwarded, Vec::new());
        assert!(!s.passed());
        assert_ne!(
            expected_transcript(std::slice::from_ref(&s)),
            actual_transcript(std::slice::from_ref(&s))
        );
    }

    #[test]
    fn summary_counts() {
        let result = |passed| VerificationResult {
            case_name: String::from("c"),
            family: String::from("f"),
            mode: String::from("enforce"),
            passed,
            expected: String::new(),
            actual: String::new(),
            diff: None,
            steps: Vec::new(),
            metrics: None,
        };
        let summary = VerificationSummary::from_results(vec![result(true), result(false)]);
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert!(!summary.all_passed());
    }
}

//! Test execution engine.

use positioner_guard_core::{Host, Interceptor};
use positioner_guard_membrane::{GuardMode, MetricsSnapshot};

use crate::diff;
use crate::fixtures::{FixtureCase, FixtureError, FixtureSet, StepOutcome};
use crate::replay::ReplayHost;
use crate::verify::{self, StepRecord, VerificationResult};

/// Everything observed while replaying one case.
#[derive(Debug, Clone)]
pub struct CaseRun {
    pub steps: Vec<StepRecord>,
    pub metrics: MetricsSnapshot,
    /// Requests that reached the (replayed) compositor.
    pub forwarded: u64,
}

impl CaseRun {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps.iter().all(StepRecord::passed)
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Guard mode being tested.
    pub mode: GuardMode,
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

    /// Run all cases in a set that apply to this runner's mode.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| case.mode.includes(self.mode))
            .map(|case| self.verify_case(&fixture_set.family, case))
            .collect()
    }

    fn verify_case(&self, family: &str, case: &FixtureCase) -> VerificationResult {
        match self.run_case(case) {
            Ok(run) => {
                let expected = verify::expected_transcript(&run.steps);
                let actual = verify::actual_transcript(&run.steps);
                let passed = run.passed();
                VerificationResult {
                    case_name: case.name.clone(),
                    family: family.to_string(),
                    mode: self.mode.as_str().to_string(),
                    passed,
                    diff: (!passed).then(|| diff::render_diff(&expected, &actual)),
                    expected,
                    actual,
                    steps: run.steps,
                    metrics: Some(run.metrics),
                }
            }
            Err(err) => VerificationResult {
                case_name: case.name.clone(),
                family: family.to_string(),
                mode: self.mode.as_str().to_string(),
                passed: false,
                expected: String::new(),
                actual: format!("error:{err}"),
                diff: Some(err.to_string()),
                steps: Vec::new(),
                metrics: None,
            },
        }
    }

    /// Replay one case through a fresh interceptor.
    pub fn run_case(&self, case: &FixtureCase) -> Result<CaseRun, FixtureError> {
        let interceptor = Interceptor::with_mode(ReplayHost::for_case(case)?, self.mode);
        let host = interceptor.host();

        let mut steps = Vec::with_capacity(case.steps.len());
        for (index, step) in case.steps.iter().enumerate() {
            let call = host.call(
                &case.name,
                index,
                &step.target,
                step.opcode,
                step.args.as_deref(),
            )?;
            let interface = host.interface_name(call.target).map(str::to_string);
            let actual = match interceptor.intercept(call) {
                Some(_) => StepOutcome::Forwarded,
                None => StepOutcome::Suppressed,
            };
            steps.push(StepRecord {
                index,
                target: step.target.clone(),
                interface,
                opcode: step.opcode,
                expected: step.expect,
                actual,
                events_expected: step.events_before.clone(),
                events_actual: host.take_delivered(),
            });
        }

        Ok(CaseRun {
            steps,
            metrics: interceptor.metrics(),
            forwarded: host.forwarded(),
        })
    }
}

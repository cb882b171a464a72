//! Report generation for replay results.

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A verification report over one or more fixture directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report title.
    pub title: String,
    /// Guard mode(s) tested.
    pub mode: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ReplayReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Mode: {}\n", self.mode));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Family | Mode | Suppressed | Synthesized | Status |\n");
        out.push_str("|------|--------|------|------------|-------------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let (suppressed, synthesized) = r.metrics.map_or_else(
                || (String::from("-"), String::from("-")),
                |m| {
                    (
                        m.suppressed_total().to_string(),
                        m.events_synthesized.to_string(),
                    )
                },
            );
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                r.case_name, r.family, r.mode, suppressed, synthesized, status
            ));
        }

        for r in self.summary.results.iter().filter(|r| !r.passed) {
            if let Some(diff) = &r.diff {
                out.push_str(&format!(
                    "\n## {} ({})\n\n```diff\n{}\n```\n",
                    r.case_name,
                    r.mode,
                    diff.trim_end()
                ));
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

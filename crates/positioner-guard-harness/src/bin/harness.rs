//! CLI entrypoint for the positioner guard replay harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use positioner_guard_harness::structured_log::LogEmitter;
use positioner_guard_harness::verify::VerificationSummary;
use positioner_guard_harness::{FixtureSet, ReplayReport, TestRunner};
use positioner_guard_membrane::GuardMode;
use tracing_subscriber::EnvFilter;

/// Replay tooling for the positioner guard.
#[derive(Debug, Parser)]
#[command(name = "positioner-guard-harness")]
#[command(about = "Fixture replay harness for the positioner guard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay every fixture in a directory and compare against expectations.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; a JSON twin is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL structured log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Guard mode to replay under (`enforce` or `off`); both when omitted.
        #[arg(long)]
        mode: Option<GuardMode>,
    },
    /// Print the per-request transcript of one fixture file.
    Replay {
        /// Fixture JSON file.
        #[arg(long)]
        trace: PathBuf,
        /// Guard mode to replay under (`enforce` or `off`).
        #[arg(long, default_value = "enforce")]
        mode: GuardMode,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
            mode,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let modes = match mode {
                Some(m) => vec![m],
                None => vec![GuardMode::Enforce, GuardMode::Off],
            };

            let fixture_sets = FixtureSet::load_dir(&fixture)?;
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let mut results = Vec::new();
            for mode in &modes {
                let runner = TestRunner::new("fixture-verify", *mode);
                for (_, set) in &fixture_sets {
                    results.extend(runner.run(set));
                }
            }

            if let Some(log_path) = log {
                let mut emitter = LogEmitter::to_file(&log_path, "fixture-verify")?;
                for result in &results {
                    emitter.emit_result(result)?;
                }
                emitter.flush()?;
                eprintln!("Wrote structured log to {}", log_path.display());
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ReplayReport {
                title: String::from("Positioner Guard Replay Report"),
                mode: modes
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join("+"),
                timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            for failed in report_doc.summary.results.iter().filter(|r| !r.passed) {
                eprintln!("FAIL {} ({})", failed.case_name, failed.mode);
                if let Some(diff) = &failed.diff {
                    eprintln!("{diff}");
                }
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Replay verification failed".into());
            }
        }
        Command::Replay { trace, mode } => {
            let set = FixtureSet::from_file(&trace)?;
            let runner = TestRunner::new("replay", mode);
            for case in set.cases.iter().filter(|c| c.mode.includes(mode)) {
                let run = runner.run_case(case)?;
                println!("== {} [{}]", case.name, mode.as_str());
                if !case.description.is_empty() {
                    println!("   {}", case.description);
                }
                print!(
                    "{}",
                    positioner_guard_harness::verify::actual_transcript(&run.steps)
                );
                println!(
                    "   forwarded={} suppressed={} synthesized={} dropped={} malformed={}",
                    run.forwarded,
                    run.metrics.suppressed_total(),
                    run.metrics.events_synthesized,
                    run.metrics.events_dropped,
                    run.metrics.malformed_calls
                );
            }
        }
    }

    Ok(())
}

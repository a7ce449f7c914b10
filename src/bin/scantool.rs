use anyhow::{Context, Result, bail};
use barcode_stability::StabilityConfig;
use barcode_stability::trace::{ReplayMode, ReplayReport, load_trace, replay};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "scantool", version, about = "Barcode stability filter tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded detection traces through the filter
    Replay {
        #[arg(long, required = true, num_args = 1..)]
        trace: Vec<PathBuf>,
        /// Stability window in milliseconds (defaults to BARCODE_STABILITY_MS, then 200)
        #[arg(long)]
        threshold_ms: Option<u64>,
        /// Report every confirming frame instead of stopping at the first
        #[arg(long)]
        every_frame: bool,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate trace files
    Check {
        #[arg(long, required = true, num_args = 1..)]
        trace: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            trace,
            threshold_ms,
            every_frame,
            json,
        } => replay_cmd(&trace, threshold_ms, every_frame, json),
        Command::Check { trace } => check_cmd(&trace),
    }
}

fn replay_cmd(
    traces: &[PathBuf],
    threshold_ms: Option<u64>,
    every_frame: bool,
    json: bool,
) -> Result<()> {
    let config = match threshold_ms {
        Some(ms) => StabilityConfig::new().with_threshold(Duration::from_millis(ms)),
        None => StabilityConfig::from_env(),
    };
    let mode = if every_frame {
        ReplayMode::EveryFrame
    } else {
        ReplayMode::FirstConfirmation
    };
    log::info!("replaying {} trace(s) with threshold {:?}", traces.len(), config.threshold);

    let results: Vec<(&PathBuf, Result<ReplayReport>)> = traces
        .par_iter()
        .map(|path| (path, replay_file(path, config, mode)))
        .collect();

    let mut failures = 0usize;
    for (path, result) in results {
        match result {
            Ok(report) if json => {
                let value = serde_json::json!({
                    "trace": path.display().to_string(),
                    "report": report,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            Ok(report) => print_report(path, &report),
            Err(err) => {
                log::error!("{:#}", err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} trace(s) failed to load", failures);
    }
    Ok(())
}

fn replay_file(path: &Path, config: StabilityConfig, mode: ReplayMode) -> Result<ReplayReport> {
    let batches = load_trace(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(replay(&batches, config, mode))
}

fn print_report(path: &Path, report: &ReplayReport) {
    println!(
        "Trace: {} ({}/{} frames processed)",
        path.display(),
        report.frames_processed,
        report.frames_total
    );
    if report.confirmations.is_empty() {
        println!("  no code confirmed");
    }
    for hit in &report.confirmations {
        println!(
            "  frame {} @ {:.1?}: {} (stable for {:.1?})",
            hit.frame, hit.captured_at, hit.code, hit.stable_for
        );
    }
    let tel = &report.telemetry;
    println!(
        "  batches={} empty={} discarded={} resets={} confirmations={} ({:.1}%) regressions={}",
        tel.batches,
        tel.empty_batches,
        tel.discarded_codes,
        tel.streak_resets,
        tel.confirmations,
        tel.confirmation_ratio() * 100.0,
        tel.clock_regressions
    );
}

fn check_cmd(traces: &[PathBuf]) -> Result<()> {
    let mut failures = 0usize;
    for path in traces {
        match load_trace(path) {
            Ok(batches) => {
                let distinct: BTreeSet<&str> = batches
                    .iter()
                    .flat_map(|batch| batch.codes())
                    .filter(|code| !code.is_empty())
                    .collect();
                let span = match (batches.first(), batches.last()) {
                    (Some(first), Some(last)) => {
                        last.captured_at().saturating_sub(first.captured_at())
                    }
                    _ => Duration::ZERO,
                };
                println!(
                    "{}: ok, {} frames over {:.1?}, {} distinct codes",
                    path.display(),
                    batches.len(),
                    span,
                    distinct.len()
                );
            }
            Err(err) => {
                println!("{}: {}", path.display(), err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} trace(s) invalid", failures);
    }
    Ok(())
}

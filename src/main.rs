use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use softmax_linear::{compare_strategies, random_problem, CompareConfig, Problem};

/// Compare the looped and vectorized softmax loss on a random or fixture
/// problem and print the report as JSON.
///
/// Set RUST_LOG=info (or debug) for progress output on stderr.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CompareConfig JSON file; defaults are used when omitted.
    config: Option<String>,
    /// Problem JSON file to compare on instead of a seeded random problem.
    #[arg(long)]
    fixture: Option<String>,
    /// Write the problem being compared to this JSON file.
    #[arg(long)]
    dump_problem: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CompareConfig::load_json(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => CompareConfig::default(),
    };

    let problem = match &args.fixture {
        Some(path) => {
            info!("loading fixture problem from {path}");
            Problem::load_json(path).with_context(|| format!("failed to load problem from {path}"))?
        }
        None => random_problem(&config).context("failed to build random problem")?,
    };

    if let Some(path) = &args.dump_problem {
        problem.save_json(path).with_context(|| format!("failed to write problem to {path}"))?;
        info!("wrote problem to {path}");
    }

    let report = compare_strategies(&problem, &config).context("strategy comparison failed")?;

    if !report.agree {
        warn!(
            "strategies disagree: loss difference {:.3e}, gradient difference {:.3e}",
            report.loss_difference, report.grad_max_abs_difference
        );
    }
    if let Some(speedup) = report.speedup() {
        info!("vectorized speedup over naive: {speedup:.1}x");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

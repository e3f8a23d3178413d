#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line simulator that plays headless Bastion matches with scripted upgrade strategies.

mod config;
mod meta_store;
mod simulator;
mod strategies;

use anyhow::{Context, Result};
use bastion_core::MetaProgress;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Cli,
    simulator::{BatchSummary, RunReport, RunSettings},
};

#[derive(Serialize)]
struct Output<'a> {
    summary: &'a BatchSummary,
    runs: &'a [RunReport],
}

/// Entry point for the Bastion simulation harness.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = cli.settings()?;
    let meta = match &cli.meta {
        Some(path) => meta_store::load(path)?,
        None => MetaProgress::default(),
    };
    info!(
        strategy = config.strategy.label(),
        seed = config.seed,
        runs = config.runs,
        max_time = config.max_time,
        "starting simulation batch"
    );

    let settings = RunSettings::new(&config, meta);
    let reports = simulator::run_batch(&settings, config.seed, config.runs);
    let summary = BatchSummary::from_reports(config.strategy, &reports);

    if cli.json {
        let output = Output {
            summary: &summary,
            runs: &reports,
        };
        let json = serde_json::to_string_pretty(&output).context("failed to encode report")?;
        println!("{json}");
    } else {
        for report in &reports {
            println!("{report}");
        }
        if reports.len() > 1 {
            print!("{summary}");
        }
    }

    if let Some(path) = &cli.save_meta {
        let credited = meta_store::credit(
            meta,
            reports.iter().map(|report| report.metrics.essence_earned),
        );
        meta_store::save(path, &credited)?;
        info!(path = %path.display(), essence = credited.essence, "saved meta progress");
    }

    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level `{level}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

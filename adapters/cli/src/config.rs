//! Simulation settings assembled from an optional TOML file and command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::strategies::StrategyName;

/// Runs headless matches driven by a scripted upgrade strategy.
#[derive(Debug, Parser)]
#[command(name = "bastion-sim", version)]
pub(crate) struct Cli {
    /// Upgrade strategy that spends gold during the match.
    #[arg(long, value_enum)]
    pub(crate) strategy: Option<StrategyName>,
    /// Simulated seconds after which a surviving run stops.
    #[arg(long)]
    pub(crate) max_time: Option<f64>,
    /// Seconds advanced by every simulation step.
    #[arg(long)]
    pub(crate) time_step: Option<f64>,
    /// Simulated seconds between strategy decisions.
    #[arg(long)]
    pub(crate) decision_interval: Option<f64>,
    /// Seed of the first run; further runs use consecutive seeds.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Number of runs to execute in parallel.
    #[arg(long)]
    pub(crate) runs: Option<u32>,
    /// TOML file providing defaults for the options above.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// JSON meta progress record applied to every run.
    #[arg(long)]
    pub(crate) meta: Option<PathBuf>,
    /// Writes the meta record, credited with the essence earned, to this path.
    #[arg(long)]
    pub(crate) save_meta: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    pub(crate) log_level: String,
    /// Prints the report as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

impl Cli {
    /// Resolves the effective settings, letting flags override the config file.
    pub(crate) fn settings(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(max_time) = self.max_time {
            config.max_time = max_time;
        }
        if let Some(time_step) = self.time_step {
            config.time_step = time_step;
        }
        if let Some(interval) = self.decision_interval {
            config.decision_interval = interval;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Tunables of a simulation batch.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub(crate) struct SimulationConfig {
    /// Upgrade strategy used by every run.
    pub(crate) strategy: StrategyName,
    /// Simulated seconds after which a surviving run stops.
    pub(crate) max_time: f64,
    /// Seconds advanced by every simulation step.
    pub(crate) time_step: f64,
    /// Simulated seconds between strategy decisions.
    pub(crate) decision_interval: f64,
    /// Seed of the first run.
    pub(crate) seed: u64,
    /// Number of runs in the batch.
    pub(crate) runs: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyName::Balanced,
            max_time: 100.0,
            time_step: 1.0 / 60.0,
            decision_interval: 1.0,
            seed: 1,
            runs: 1,
        }
    }
}

impl SimulationConfig {
    /// Reads and parses a TOML config file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid simulation config at {}", path.display()))
    }

    /// Parses TOML contents; missing keys keep their defaults.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse simulation config toml contents")
    }

    fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            bail!("time step must be a positive number of seconds, got {}", self.time_step);
        }
        if !(self.max_time.is_finite() && self.max_time >= 0.0) {
            bail!("max time must be a non-negative number of seconds, got {}", self.max_time);
        }
        if !(self.decision_interval.is_finite() && self.decision_interval >= 0.0) {
            bail!(
                "decision interval must be a non-negative number of seconds, got {}",
                self.decision_interval
            );
        }
        if self.runs == 0 {
            bail!("at least one run is required");
        }
        Ok(())
    }
}

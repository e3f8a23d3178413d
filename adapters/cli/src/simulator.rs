//! Headless match driver that records metrics from the event bus.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt,
    rc::Rc,
    time::Duration,
};

use bastion_core::{tuning, Event, EventBus, EventKind, MetaProgress, Purchasable, UpgradeKind};
use bastion_game::{Game, MatchConfig};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::SimulationConfig,
    strategies::{Menu, Strategy, StrategyName},
};

/// Simulated seconds between progress log lines.
const PROGRESS_INTERVAL: f64 = 10.0;
/// Bucket for tower damage without an enemy source.
const UNKNOWN_SOURCE: &str = "other";

/// Parameters shared by every run of a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunSettings {
    /// Strategy instantiated for every run.
    pub(crate) strategy: StrategyName,
    /// Simulated seconds after which a surviving run stops.
    pub(crate) max_time: f64,
    /// Seconds advanced by every step.
    pub(crate) time_step: f64,
    /// Simulated seconds between strategy decisions.
    pub(crate) decision_interval: f64,
    /// Meta progress applied when every match is constructed.
    pub(crate) meta: MetaProgress,
}

impl RunSettings {
    /// Combines resolved config with the loaded meta record.
    #[must_use]
    pub(crate) fn new(config: &SimulationConfig, meta: MetaProgress) -> Self {
        Self {
            strategy: config.strategy,
            max_time: config.max_time,
            time_step: config.time_step,
            decision_interval: config.decision_interval,
            meta,
        }
    }
}

/// One successful purchase made by the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseRecord {
    /// Survival time at which the purchase happened.
    pub(crate) time: f32,
    /// Upgrade that was bought.
    pub(crate) upgrade: Purchasable,
    /// Gold deducted.
    pub(crate) cost: u64,
    /// Level reached.
    pub(crate) level: u32,
}

/// Counters accumulated by bus subscribers during a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Metrics {
    /// Enemies killed.
    pub(crate) kills: u64,
    /// Enemies killed per kind.
    pub(crate) kills_by_kind: BTreeMap<&'static str, u64>,
    /// Damage removed from enemies.
    pub(crate) damage_dealt: f64,
    /// Damage removed from enemies per kind.
    pub(crate) damage_dealt_by_kind: BTreeMap<&'static str, f64>,
    /// Health lost by the defender.
    pub(crate) damage_taken: f64,
    /// Health lost by the defender per source kind.
    pub(crate) damage_taken_by_kind: BTreeMap<&'static str, f64>,
    /// Gold spent on in-match and mini upgrades.
    pub(crate) gold_spent: u64,
    /// Waves cleared.
    pub(crate) waves_completed: u32,
    /// Essence awarded at game over.
    pub(crate) essence_earned: u64,
    /// Purchases in the order they happened.
    pub(crate) purchases: Vec<PurchaseRecord>,
}

/// Tower and defender figures at the end of a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FinalStats {
    /// Projectile damage.
    pub(crate) damage: f32,
    /// Shots per second.
    pub(crate) fire_rate: f32,
    /// Targeting range.
    pub(crate) range: f32,
    /// Maximum health.
    pub(crate) max_health: f32,
    /// Health regenerated per second.
    pub(crate) health_regen: f32,
}

/// Outcome of a single simulated match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RunReport {
    /// Seed of the match.
    pub(crate) seed: u64,
    /// Strategy that drove the match.
    pub(crate) strategy: StrategyName,
    /// Wave reached.
    pub(crate) final_wave: u32,
    /// Scaled seconds survived.
    pub(crate) survival_time: f32,
    /// Whether the defender fell before the time limit.
    pub(crate) game_over: bool,
    /// Final score.
    pub(crate) score: u64,
    /// Gold gained from every source over the match.
    pub(crate) gold_earned: u64,
    /// Share of earned gold that was spent.
    pub(crate) gold_efficiency: f64,
    /// Stats at the end of the match.
    pub(crate) final_stats: FinalStats,
    /// Counters recorded from the event bus.
    pub(crate) metrics: Metrics,
}

/// Aggregate figures over a batch of runs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchSummary {
    /// Strategy shared by the runs.
    pub(crate) strategy: StrategyName,
    /// Number of runs.
    pub(crate) runs: usize,
    /// Runs that ended with the defender falling.
    pub(crate) game_overs: usize,
    /// Mean wave reached.
    pub(crate) mean_wave: f64,
    /// Highest wave reached.
    pub(crate) best_wave: u32,
    /// Mean seconds survived.
    pub(crate) mean_survival_time: f64,
    /// Essence earned across all runs.
    pub(crate) total_essence: u64,
}

impl BatchSummary {
    /// Aggregates the reports of one batch.
    #[must_use]
    pub(crate) fn from_reports(strategy: StrategyName, reports: &[RunReport]) -> Self {
        let runs = reports.len();
        let divisor = runs.max(1) as f64;
        Self {
            strategy,
            runs,
            game_overs: reports.iter().filter(|report| report.game_over).count(),
            mean_wave: reports
                .iter()
                .map(|report| f64::from(report.final_wave))
                .sum::<f64>()
                / divisor,
            best_wave: reports
                .iter()
                .map(|report| report.final_wave)
                .max()
                .unwrap_or(0),
            mean_survival_time: reports
                .iter()
                .map(|report| f64::from(report.survival_time))
                .sum::<f64>()
                / divisor,
            total_essence: reports
                .iter()
                .map(|report| report.metrics.essence_earned)
                .sum(),
        }
    }
}

/// Runs `runs` matches in parallel with consecutive seeds starting at `first_seed`.
///
/// Reports are returned in seed order.
#[must_use]
pub(crate) fn run_batch(settings: &RunSettings, first_seed: u64, runs: u32) -> Vec<RunReport> {
    (0..u64::from(runs))
        .into_par_iter()
        .map(|offset| run(first_seed.wrapping_add(offset), settings))
        .collect()
}

/// Plays a single match to game over or the time limit.
#[must_use]
pub(crate) fn run(seed: u64, settings: &RunSettings) -> RunReport {
    let mut game = Game::new(MatchConfig::new(seed).with_meta(settings.meta));
    let clock = Rc::new(Cell::new(0.0_f32));
    let metrics = subscribe(game.events(), &clock);
    let mut strategy = settings.strategy.build();
    let step = Duration::from_secs_f64(settings.time_step);

    let mut simulated = 0.0_f64;
    let mut last_decision = 0.0_f64;
    let mut next_progress = PROGRESS_INTERVAL;
    while simulated < settings.max_time && !game.is_game_over() {
        game.update(step);

        if simulated - last_decision >= settings.decision_interval {
            decide(&mut game, strategy.as_mut(), &clock);
            last_decision = simulated;
        }

        if simulated >= next_progress {
            let state = game.state();
            debug!(
                seed,
                time = simulated,
                wave = state.wave,
                health = state.health,
                gold = state.gold,
                enemies = state.enemy_count,
                score = state.score,
                "simulation progress"
            );
            next_progress += PROGRESS_INTERVAL;
        }

        simulated += settings.time_step;
    }

    let state = game.state();
    game.destroy();
    let metrics = metrics.take();

    let gold_earned = (state.gold + metrics.gold_spent).saturating_sub(tuning::STARTING_GOLD);
    let gold_efficiency = if gold_earned == 0 {
        0.0
    } else {
        metrics.gold_spent as f64 / gold_earned as f64
    };

    info!(
        seed,
        wave = state.wave,
        survival_time = state.survival_time,
        game_over = state.is_game_over,
        "simulation finished"
    );

    RunReport {
        seed,
        strategy: settings.strategy,
        final_wave: state.wave,
        survival_time: state.survival_time,
        game_over: state.is_game_over,
        score: state.score,
        gold_earned,
        gold_efficiency,
        final_stats: FinalStats {
            damage: state.tower_stats.damage,
            fire_rate: state.tower_stats.fire_rate,
            range: state.tower_stats.range,
            max_health: state.max_health,
            health_regen: state.economy.health_regen,
        },
        metrics,
    }
}

fn decide(game: &mut Game, strategy: &mut dyn Strategy, clock: &Cell<f32>) {
    let state = game.state();
    clock.set(state.survival_time);
    let menu = Menu::new(
        state.gold,
        UpgradeKind::ALL
            .into_iter()
            .map(|kind| (kind, game.upgrade_cost(kind))),
    );

    let Some(kind) = strategy.decide(&state, &menu) else {
        return;
    };
    if let Err(error) = game.purchase_upgrade(kind) {
        debug!(upgrade = ?kind, %error, "strategy choice refused");
    }
}

fn subscribe(bus: &mut EventBus, clock: &Rc<Cell<f32>>) -> Rc<RefCell<Metrics>> {
    let metrics = Rc::new(RefCell::new(Metrics::default()));

    let sink = Rc::clone(&metrics);
    let _ = bus.on(EventKind::EnemyKilled, move |event| {
        if let Event::EnemyKilled(killed) = event {
            let mut metrics = sink.borrow_mut();
            metrics.kills += 1;
            *metrics.kills_by_kind.entry(killed.kind.label()).or_default() += 1;
        }
    });

    let sink = Rc::clone(&metrics);
    let _ = bus.on(EventKind::EnemyDamaged, move |event| {
        if let Event::EnemyDamaged { kind, damage, .. } = event {
            let mut metrics = sink.borrow_mut();
            metrics.damage_dealt += f64::from(*damage);
            *metrics.damage_dealt_by_kind.entry(kind.label()).or_default() += f64::from(*damage);
        }
    });

    let sink = Rc::clone(&metrics);
    let _ = bus.on(EventKind::TowerDamaged, move |event| {
        if let Event::TowerDamaged { damage, source } = event {
            let label = source.map_or(UNKNOWN_SOURCE, |kind| kind.label());
            let mut metrics = sink.borrow_mut();
            metrics.damage_taken += f64::from(*damage);
            *metrics.damage_taken_by_kind.entry(label).or_default() += f64::from(*damage);
        }
    });

    let sink = Rc::clone(&metrics);
    let _ = bus.on(EventKind::WaveCompleted, move |_| {
        sink.borrow_mut().waves_completed += 1;
    });

    let sink = Rc::clone(&metrics);
    let _ = bus.on(EventKind::GameOver, move |event| {
        if let Event::GameOver { essence, .. } = event {
            sink.borrow_mut().essence_earned = *essence;
        }
    });

    let sink = Rc::clone(&metrics);
    let clock = Rc::clone(clock);
    let _ = bus.on(EventKind::UpgradePurchased, move |event| {
        if let Event::UpgradePurchased {
            upgrade,
            cost,
            new_level,
        } = event
        {
            let mut metrics = sink.borrow_mut();
            if !matches!(upgrade, Purchasable::Permanent(_)) {
                metrics.gold_spent += cost;
            }
            metrics.purchases.push(PurchaseRecord {
                time: clock.get(),
                upgrade: *upgrade,
                cost: *cost,
                level: *new_level,
            });
        }
    });

    metrics
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.game_over {
            "defender fell"
        } else {
            "time limit reached"
        };
        writeln!(f, "=== Run seed {} ({}) ===", self.seed, self.strategy.label())?;
        writeln!(
            f,
            "Survived {:.1}s, final wave {}, {outcome}",
            self.survival_time, self.final_wave
        )?;
        writeln!(f, "Score {}", self.score)?;
        writeln!(
            f,
            "Kills {} | damage dealt {:.0} | damage taken {:.0}",
            self.metrics.kills, self.metrics.damage_dealt, self.metrics.damage_taken
        )?;
        writeln!(
            f,
            "Gold earned {} | spent {} | efficiency {:.1}% | essence {}",
            self.gold_earned,
            self.metrics.gold_spent,
            self.gold_efficiency * 100.0,
            self.metrics.essence_earned
        )?;
        writeln!(
            f,
            "Tower damage {:.1} | fire rate {:.1}/s | range {:.0} | max health {:.0} | regen {:.1}/s",
            self.final_stats.damage,
            self.final_stats.fire_rate,
            self.final_stats.range,
            self.final_stats.max_health,
            self.final_stats.health_regen
        )?;

        let mut bought: BTreeMap<String, usize> = BTreeMap::new();
        for purchase in &self.metrics.purchases {
            *bought.entry(format!("{:?}", purchase.upgrade)).or_default() += 1;
        }
        if bought.is_empty() {
            writeln!(f, "No upgrades purchased")?;
        }
        for (upgrade, count) in &bought {
            writeln!(f, "  {upgrade}: {count} purchases")?;
        }
        for (kind, count) in &self.metrics.kills_by_kind {
            writeln!(f, "  {kind}: {count} killed")?;
        }
        for (kind, damage) in &self.metrics.damage_taken_by_kind {
            writeln!(f, "  {kind}: {damage:.0} damage taken")?;
        }
        Ok(())
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} over {} runs ===",
            self.strategy.label(),
            self.runs
        )?;
        writeln!(
            f,
            "Mean wave {:.2} | best wave {} | mean survival {:.1}s | fell {} times | essence {}",
            self.mean_wave,
            self.best_wave,
            self.mean_survival_time,
            self.game_overs,
            self.total_essence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(strategy: StrategyName, max_time: f64) -> RunSettings {
        RunSettings {
            strategy,
            max_time,
            time_step: 1.0 / 60.0,
            decision_interval: 1.0,
            meta: MetaProgress::default(),
        }
    }

    #[test]
    fn run_stops_at_the_time_limit() {
        let report = run(3, &settings(StrategyName::Balanced, 20.0));

        assert!(!report.game_over);
        assert!((report.survival_time - 20.0).abs() < 0.1);
        assert!(report.final_wave >= 1);
        assert_eq!(report.metrics.essence_earned, 0);
    }

    #[test]
    fn purchases_are_logged_and_paid_for() {
        let report = run(3, &settings(StrategyName::Cheapest, 30.0));

        assert!(!report.metrics.purchases.is_empty());
        let spent: u64 = report.metrics.purchases.iter().map(|p| p.cost).sum();
        assert_eq!(spent, report.metrics.gold_spent);
        assert!(report.gold_earned + tuning::STARTING_GOLD >= report.metrics.gold_spent);
        assert!(report
            .metrics
            .purchases
            .windows(2)
            .all(|pair| pair[0].time <= pair[1].time));
    }

    #[test]
    fn kills_are_broken_down_by_kind() {
        let report = run(8, &settings(StrategyName::Damage, 30.0));

        assert!(report.metrics.kills > 0);
        assert_eq!(
            report.metrics.kills_by_kind.values().sum::<u64>(),
            report.metrics.kills
        );
        assert!(report.metrics.damage_dealt > 0.0);
    }

    #[test]
    fn batch_runs_consecutive_seeds_in_order() {
        let settings = settings(StrategyName::Tank, 10.0);

        let reports = run_batch(&settings, 40, 3);

        assert_eq!(
            reports.iter().map(|report| report.seed).collect::<Vec<_>>(),
            vec![40, 41, 42]
        );
        assert_eq!(reports[1], run(41, &settings));
    }

    #[test]
    fn summary_averages_the_batch() {
        let settings = settings(StrategyName::Economic, 10.0);
        let reports = run_batch(&settings, 1, 2);

        let summary = BatchSummary::from_reports(StrategyName::Economic, &reports);

        assert_eq!(summary.runs, 2);
        assert_eq!(summary.game_overs, 0);
        assert!(summary.mean_wave >= 1.0);
        assert!(summary.best_wave >= 1);
    }
}

//! Plain-data snapshot of a running match.

use bastion_core::{tuning, MiniUpgradeLevels, TowerStats, UpgradeLevels};
use bastion_system_waves::WaveProgress;
use serde::Serialize;

/// Speed boost ability bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityState {
    /// Whether the boost currently doubles the fire rate.
    pub speed_boost_active: bool,
    /// Seconds left on the running boost.
    pub speed_boost_remaining: f32,
    /// Seconds before the boost can be activated again.
    pub speed_boost_cooldown: f32,
}

/// Kill streak bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillStreakState {
    /// Kills chained inside the streak window.
    pub count: u32,
    /// Seconds left before the streak lapses.
    pub timer: f32,
    /// Whether the streak damage bonus is running.
    pub active: bool,
}

/// Income and sustain rates read every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyState {
    /// Flat gold credited at the end of every wave.
    pub gold_per_round: u64,
    /// Fraction of banked gold paid every full second.
    pub interest_rate: f64,
    /// Seconds accumulated toward the next interest payment.
    pub interest_timer: f32,
    /// Health regenerated per second.
    pub health_regen: f32,
    /// Multiplier applied to kill rewards.
    pub gold_multiplier: f64,
    /// Multiplier applied to essence earned at game over.
    pub essence_gain: f64,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            gold_per_round: 0,
            interest_rate: 0.0,
            interest_timer: 0.0,
            health_regen: 0.0,
            gold_multiplier: 1.0,
            essence_gain: 1.0,
        }
    }
}

/// Complete state of a match as seen by renderers and tooling.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current health of the defender.
    pub health: f32,
    /// Maximum health of the defender.
    pub max_health: f32,
    /// In-match currency.
    pub gold: u64,
    /// Sum of kill rewards.
    pub score: u64,
    /// Wave currently running, or the next wave while idle.
    pub wave: u32,
    /// Scaled seconds survived.
    pub survival_time: f32,
    /// Whether updates are suspended.
    pub is_paused: bool,
    /// Whether the defender fell. Never reverts within a match.
    pub is_game_over: bool,
    /// Time scale applied to every update.
    pub speed_multiplier: f32,
    /// Current tower stats, including temporary overrides.
    pub tower_stats: TowerStats,
    /// In-match upgrade levels.
    pub upgrades: UpgradeLevels,
    /// Mini upgrade levels.
    pub mini_upgrades: MiniUpgradeLevels,
    /// Speed boost bookkeeping.
    pub ability: AbilityState,
    /// Kill streak bookkeeping.
    pub kill_streak: KillStreakState,
    /// Income and sustain rates.
    pub economy: EconomyState,
    /// Health recorded when the current wave started.
    pub wave_start_health: f32,
    /// Consecutive waves cleared without losing health.
    pub perfect_wave_streak: u32,
    /// Live enemies on the board.
    pub enemy_count: usize,
    /// Wave state machine view.
    pub wave_progress: WaveProgress,
}

impl GameState {
    pub(crate) fn new(
        max_health: f32,
        tower_stats: TowerStats,
        economy: EconomyState,
        wave_progress: WaveProgress,
    ) -> Self {
        Self {
            health: max_health,
            max_health,
            gold: tuning::STARTING_GOLD,
            score: 0,
            wave: wave_progress.current_wave,
            survival_time: 0.0,
            is_paused: false,
            is_game_over: false,
            speed_multiplier: 1.0,
            tower_stats,
            upgrades: UpgradeLevels::default(),
            mini_upgrades: MiniUpgradeLevels::default(),
            ability: AbilityState::default(),
            kill_streak: KillStreakState::default(),
            economy,
            wave_start_health: max_health,
            perfect_wave_streak: 0,
            enemy_count: 0,
            wave_progress,
        }
    }
}

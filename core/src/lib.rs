#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion simulation.
//!
//! This crate defines the vocabulary that connects the entity crate, the pure
//! systems, and the match orchestrator. Systems never hold references to one
//! another: whenever a side effect must cross a system boundary it is
//! expressed as an [`Event`] and delivered through the per-match
//! [`EventBus`]. Entities live in generic [`Pool`]s and are addressed by
//! generation-checked [`EntityId`] handles so identity survives reuse.

pub mod bus;
pub mod pool;
pub mod rng;
pub mod tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use bus::{EventBus, SubscriptionId};
pub use pool::{EntityId, Pool, PoolError, Poolable};
pub use rng::MatchRng;

/// Enumerates every enemy archetype the wave system can produce.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    /// Baseline attacker with moderate health and speed.
    Basic,
    /// Fragile, fast attacker that spawns in groups.
    Swarm,
    /// Slow, heavily armoured attacker worth a large reward.
    Tank,
    /// Attacker that breaks into several swarm enemies when it dies.
    Splitter,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Swarm,
        EnemyKind::Tank,
        EnemyKind::Splitter,
    ];

    /// Stable lowercase label used by diagnostics and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Swarm => "swarm",
            EnemyKind::Tank => "tank",
            EnemyKind::Splitter => "splitter",
        }
    }
}

/// Mutable combat statistics of the tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerStats {
    /// Damage applied by each projectile.
    pub damage: f32,
    /// Shots fired per second.
    pub fire_rate: f32,
    /// Maximum targeting distance measured from the tower centre.
    pub range: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Additional projectiles fired alongside the primary shot.
    pub multi_shot_count: u32,
    /// Number of times a projectile may chain to a nearby enemy.
    pub bounce_count: u32,
}

impl TowerStats {
    /// Statistics of a tower with no upgrades of any kind.
    #[must_use]
    pub const fn base() -> Self {
        Self {
            damage: tuning::BASE_TOWER_DAMAGE,
            fire_rate: tuning::BASE_TOWER_FIRE_RATE,
            range: tuning::BASE_TOWER_RANGE,
            projectile_speed: tuning::BASE_PROJECTILE_SPEED,
            multi_shot_count: 0,
            bounce_count: 0,
        }
    }
}

impl Default for TowerStats {
    fn default() -> Self {
        Self::base()
    }
}

/// Gold-funded upgrades available during a match.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    /// Raises projectile damage.
    Damage,
    /// Raises the tower's fire rate.
    FireRate,
    /// Raises maximum and current health.
    MaxHealth,
    /// Grants passive health regeneration.
    HealthRegen,
    /// Extends targeting range.
    Range,
    /// Adds a flat gold bonus at the end of every wave.
    GoldPerRound,
    /// Pays interest on banked gold every second.
    Interest,
}

impl UpgradeKind {
    /// Every in-match upgrade in declaration order.
    pub const ALL: [UpgradeKind; 7] = [
        UpgradeKind::Damage,
        UpgradeKind::FireRate,
        UpgradeKind::MaxHealth,
        UpgradeKind::HealthRegen,
        UpgradeKind::Range,
        UpgradeKind::GoldPerRound,
        UpgradeKind::Interest,
    ];
}

/// Per-type levels of the in-match upgrades.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeLevels {
    /// Level of [`UpgradeKind::Damage`].
    pub damage: u32,
    /// Level of [`UpgradeKind::FireRate`].
    pub fire_rate: u32,
    /// Level of [`UpgradeKind::MaxHealth`].
    pub max_health: u32,
    /// Level of [`UpgradeKind::HealthRegen`].
    pub health_regen: u32,
    /// Level of [`UpgradeKind::Range`].
    pub range: u32,
    /// Level of [`UpgradeKind::GoldPerRound`].
    pub gold_per_round: u32,
    /// Level of [`UpgradeKind::Interest`].
    pub interest: u32,
}

impl UpgradeLevels {
    /// Returns the current level of the provided upgrade.
    #[must_use]
    pub const fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Damage => self.damage,
            UpgradeKind::FireRate => self.fire_rate,
            UpgradeKind::MaxHealth => self.max_health,
            UpgradeKind::HealthRegen => self.health_regen,
            UpgradeKind::Range => self.range,
            UpgradeKind::GoldPerRound => self.gold_per_round,
            UpgradeKind::Interest => self.interest,
        }
    }

    /// Mutable access to the level of the provided upgrade.
    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Damage => &mut self.damage,
            UpgradeKind::FireRate => &mut self.fire_rate,
            UpgradeKind::MaxHealth => &mut self.max_health,
            UpgradeKind::HealthRegen => &mut self.health_regen,
            UpgradeKind::Range => &mut self.range,
            UpgradeKind::GoldPerRound => &mut self.gold_per_round,
            UpgradeKind::Interest => &mut self.interest,
        }
    }
}

/// Cheap incremental upgrades offered alongside the main upgrade menu.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum MiniUpgradeKind {
    /// Small fire rate bump.
    QuickShot,
    /// Small damage bump.
    SharpAmmo,
    /// Small maximum health bump.
    Bandages,
}

impl MiniUpgradeKind {
    /// Every mini upgrade in declaration order.
    pub const ALL: [MiniUpgradeKind; 3] = [
        MiniUpgradeKind::QuickShot,
        MiniUpgradeKind::SharpAmmo,
        MiniUpgradeKind::Bandages,
    ];
}

/// Per-type levels of the mini upgrades.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniUpgradeLevels {
    /// Level of [`MiniUpgradeKind::QuickShot`].
    pub quick_shot: u32,
    /// Level of [`MiniUpgradeKind::SharpAmmo`].
    pub sharp_ammo: u32,
    /// Level of [`MiniUpgradeKind::Bandages`].
    pub bandages: u32,
}

impl MiniUpgradeLevels {
    /// Returns the current level of the provided mini upgrade.
    #[must_use]
    pub const fn level(&self, kind: MiniUpgradeKind) -> u32 {
        match kind {
            MiniUpgradeKind::QuickShot => self.quick_shot,
            MiniUpgradeKind::SharpAmmo => self.sharp_ammo,
            MiniUpgradeKind::Bandages => self.bandages,
        }
    }

    /// Mutable access to the level of the provided mini upgrade.
    pub fn level_mut(&mut self, kind: MiniUpgradeKind) -> &mut u32 {
        match kind {
            MiniUpgradeKind::QuickShot => &mut self.quick_shot,
            MiniUpgradeKind::SharpAmmo => &mut self.sharp_ammo,
            MiniUpgradeKind::Bandages => &mut self.bandages,
        }
    }
}

/// Essence-funded upgrades that persist across matches.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PermanentUpgradeKind {
    /// Raises the tower's starting damage.
    StartingDamage,
    /// Raises the tower's starting fire rate.
    StartingFireRate,
    /// Raises the defender's starting maximum health.
    StartingHealth,
    /// Multiplies gold earned from kills.
    GoldMultiplier,
    /// Multiplies essence earned at game over.
    EssenceGain,
    /// Adds projectiles to every salvo.
    MultiShot,
    /// Lets projectiles chain to nearby enemies.
    Bounce,
}

impl PermanentUpgradeKind {
    /// Every permanent upgrade in declaration order.
    pub const ALL: [PermanentUpgradeKind; 7] = [
        PermanentUpgradeKind::StartingDamage,
        PermanentUpgradeKind::StartingFireRate,
        PermanentUpgradeKind::StartingHealth,
        PermanentUpgradeKind::GoldMultiplier,
        PermanentUpgradeKind::EssenceGain,
        PermanentUpgradeKind::MultiShot,
        PermanentUpgradeKind::Bounce,
    ];

    /// Reports whether the upgrade is stored as a multiplier offset by one.
    #[must_use]
    pub const fn is_multiplier(self) -> bool {
        matches!(
            self,
            PermanentUpgradeKind::GoldMultiplier | PermanentUpgradeKind::EssenceGain
        )
    }
}

/// Persistent permanent-upgrade levels.
///
/// The gold and essence multipliers are stored as `1.0 + 0.1 * level` so
/// the record can be applied directly; every other field is an integer level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermanentUpgrades {
    /// Level of [`PermanentUpgradeKind::StartingDamage`].
    pub starting_damage: u32,
    /// Level of [`PermanentUpgradeKind::StartingFireRate`].
    pub starting_fire_rate: u32,
    /// Level of [`PermanentUpgradeKind::StartingHealth`].
    pub starting_health: u32,
    /// Gold multiplier applied to kill rewards.
    pub gold_multiplier: f64,
    /// Multiplier applied to essence earned at game over.
    pub essence_gain: f64,
    /// Level of [`PermanentUpgradeKind::MultiShot`].
    pub multi_shot: u32,
    /// Level of [`PermanentUpgradeKind::Bounce`].
    pub bounce: u32,
}

impl PermanentUpgrades {
    /// Record with every upgrade at level zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            starting_damage: 0,
            starting_fire_rate: 0,
            starting_health: 0,
            gold_multiplier: 1.0,
            essence_gain: 1.0,
            multi_shot: 0,
            bounce: 0,
        }
    }

    /// Integer level of the provided upgrade, converting multipliers back.
    #[must_use]
    pub fn level(&self, kind: PermanentUpgradeKind) -> u32 {
        match kind {
            PermanentUpgradeKind::StartingDamage => self.starting_damage,
            PermanentUpgradeKind::StartingFireRate => self.starting_fire_rate,
            PermanentUpgradeKind::StartingHealth => self.starting_health,
            PermanentUpgradeKind::GoldMultiplier => multiplier_level(self.gold_multiplier),
            PermanentUpgradeKind::EssenceGain => multiplier_level(self.essence_gain),
            PermanentUpgradeKind::MultiShot => self.multi_shot,
            PermanentUpgradeKind::Bounce => self.bounce,
        }
    }

    /// Stores the provided integer level, encoding multipliers as `1 + 0.1 * level`.
    pub fn set_level(&mut self, kind: PermanentUpgradeKind, level: u32) {
        match kind {
            PermanentUpgradeKind::StartingDamage => self.starting_damage = level,
            PermanentUpgradeKind::StartingFireRate => self.starting_fire_rate = level,
            PermanentUpgradeKind::StartingHealth => self.starting_health = level,
            PermanentUpgradeKind::GoldMultiplier => self.gold_multiplier = level_multiplier(level),
            PermanentUpgradeKind::EssenceGain => self.essence_gain = level_multiplier(level),
            PermanentUpgradeKind::MultiShot => self.multi_shot = level,
            PermanentUpgradeKind::Bounce => self.bounce = level,
        }
    }
}

impl Default for PermanentUpgrades {
    fn default() -> Self {
        Self::new()
    }
}

fn multiplier_level(multiplier: f64) -> u32 {
    let level = ((multiplier - 1.0) * 10.0).round();
    if level <= 0.0 {
        0
    } else {
        level as u32
    }
}

fn level_multiplier(level: u32) -> f64 {
    f64::from(10 + level) / 10.0
}

/// Persistence record exchanged with the storage collaborator between matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaProgress {
    /// Unspent meta-currency.
    pub essence: u64,
    /// Permanent upgrade levels purchased so far.
    pub upgrades: PermanentUpgrades,
}

impl MetaProgress {
    /// Creates a record from an essence balance and upgrade levels.
    #[must_use]
    pub const fn new(essence: u64, upgrades: PermanentUpgrades) -> Self {
        Self { essence, upgrades }
    }
}

/// Identifies any purchasable upgrade for purchase notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Purchasable {
    /// Gold-funded in-match upgrade.
    Upgrade(UpgradeKind),
    /// Gold-funded mini upgrade.
    Mini(MiniUpgradeKind),
    /// Essence-funded permanent upgrade.
    Permanent(PermanentUpgradeKind),
}

/// Reasons a purchase request was refused. Refusals never change state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    /// The upgrade already reached its configured maximum level.
    #[error("upgrade is already at its maximum level of {max_level}")]
    MaxLevel {
        /// Highest purchasable level of the upgrade.
        max_level: u32,
    },
    /// The wallet cannot cover the current price.
    #[error("upgrade costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Current price of the upgrade.
        cost: u64,
        /// Balance available for the purchase.
        available: u64,
    },
    /// The match has ended and no longer accepts purchases.
    #[error("the match is over")]
    MatchOver,
}

/// Describes how an enemy died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeathKind {
    /// The enemy was simply removed.
    Normal,
    /// The enemy broke apart into replacement enemies.
    Splitter,
    /// The enemy burst in an explosion.
    Exploding,
}

/// Replacement enemies a splitter requests on death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitSpawn {
    /// Number of replacement enemies to spawn.
    pub count: u32,
    /// Kind of the replacement enemies.
    pub kind: EnemyKind,
    /// Location the replacements surround.
    pub position: Vec2,
}

/// Area burst reported by an exploding death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    /// Centre of the burst.
    pub position: Vec2,
    /// Radius of the burst.
    pub radius: f32,
    /// Damage carried by the burst.
    pub damage: f32,
}

/// Payload describing an enemy that just died.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyKilled {
    /// Pool handle of the enemy; valid until the wave system sweeps it.
    pub enemy: EntityId,
    /// Kind of the enemy that died.
    pub kind: EnemyKind,
    /// Location of the enemy at the moment of death.
    pub position: Vec2,
    /// Base reward granted for the kill before multipliers.
    pub reward: u64,
    /// How the enemy died.
    pub death: DeathKind,
    /// Replacement enemies requested by a splitter death.
    pub split: Option<SplitSpawn>,
    /// Burst reported by an exploding death.
    pub explosion: Option<Explosion>,
}

/// Discriminant of [`Event`] used as the subscription key on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Matches [`Event::EnemySpawned`].
    EnemySpawned,
    /// Matches [`Event::EnemyDamaged`].
    EnemyDamaged,
    /// Matches [`Event::EnemyKilled`].
    EnemyKilled,
    /// Matches [`Event::ProjectileSpawned`].
    ProjectileSpawned,
    /// Matches [`Event::TowerDamaged`].
    TowerDamaged,
    /// Matches [`Event::TowerShoot`].
    TowerShoot,
    /// Matches [`Event::WaveStarted`].
    WaveStarted,
    /// Matches [`Event::WaveCompleted`].
    WaveCompleted,
    /// Matches [`Event::GameOver`].
    GameOver,
    /// Matches [`Event::UpgradePurchased`].
    UpgradePurchased,
}

/// Notifications published on the per-match event bus.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// An enemy entered the arena.
    EnemySpawned {
        /// Pool handle of the new enemy.
        enemy: EntityId,
        /// Kind of the new enemy.
        kind: EnemyKind,
        /// Spawn location.
        position: Vec2,
    },
    /// An enemy absorbed damage without necessarily dying.
    EnemyDamaged {
        /// Pool handle of the damaged enemy.
        enemy: EntityId,
        /// Kind of the damaged enemy.
        kind: EnemyKind,
        /// Damage actually removed from the enemy's health.
        damage: f32,
        /// Health left after the hit.
        remaining_health: f32,
    },
    /// An enemy died.
    EnemyKilled(EnemyKilled),
    /// A projectile was drawn from the pool and is now live.
    ProjectileSpawned {
        /// Pool handle of the projectile.
        projectile: EntityId,
        /// Launch position.
        position: Vec2,
        /// Whether the projectile was produced by a bounce.
        chained: bool,
    },
    /// The tower lost health.
    TowerDamaged {
        /// Health removed from the defender.
        damage: f32,
        /// Kind of the enemy responsible, when one exists.
        source: Option<EnemyKind>,
    },
    /// The tower fired a salvo.
    TowerShoot {
        /// Origin of the salvo.
        position: Vec2,
        /// Base aim angle in radians.
        angle: f32,
        /// Whether the salvo contained more than one projectile.
        is_multi_shot: bool,
    },
    /// A wave began spawning.
    WaveStarted {
        /// Number of the wave.
        wave: u32,
        /// Total enemies queued by the composition.
        enemy_count: u32,
    },
    /// A wave was fully spawned and cleared.
    WaveCompleted {
        /// Number of the wave.
        wave: u32,
        /// Base bonus gold declared by the composition.
        bonus_gold: u64,
    },
    /// The defender fell and the match ended.
    GameOver {
        /// Final score of the match.
        score: u64,
        /// Essence awarded for the match.
        essence: u64,
    },
    /// An upgrade purchase succeeded.
    UpgradePurchased {
        /// The upgrade that was bought.
        upgrade: Purchasable,
        /// Price that was deducted.
        cost: u64,
        /// Level reached by the purchase.
        new_level: u32,
    },
}

impl Event {
    /// Returns the subscription key of the event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::EnemySpawned { .. } => EventKind::EnemySpawned,
            Event::EnemyDamaged { .. } => EventKind::EnemyDamaged,
            Event::EnemyKilled(_) => EventKind::EnemyKilled,
            Event::ProjectileSpawned { .. } => EventKind::ProjectileSpawned,
            Event::TowerDamaged { .. } => EventKind::TowerDamaged,
            Event::TowerShoot { .. } => EventKind::TowerShoot,
            Event::WaveStarted { .. } => EventKind::WaveStarted,
            Event::WaveCompleted { .. } => EventKind::WaveCompleted,
            Event::GameOver { .. } => EventKind::GameOver,
            Event::UpgradePurchased { .. } => EventKind::UpgradePurchased,
        }
    }
}

/// Computes `floor(base * scaling^level)`, the price curve shared by every upgrade.
#[must_use]
pub fn scaled_cost(base_cost: u64, scaling: f64, level: u32) -> u64 {
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    (base_cost as f64 * scaling.powi(exponent)).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn multiplier_upgrades_store_offset_levels() {
        let mut upgrades = PermanentUpgrades::new();
        upgrades.set_level(PermanentUpgradeKind::GoldMultiplier, 3);

        assert!((upgrades.gold_multiplier - 1.3).abs() < 1e-9);
        assert_eq!(upgrades.level(PermanentUpgradeKind::GoldMultiplier), 3);
        assert_eq!(upgrades.level(PermanentUpgradeKind::EssenceGain), 0);
    }

    #[test]
    fn multiplier_level_tolerates_float_drift() {
        let upgrades = PermanentUpgrades {
            essence_gain: 1.0 + 0.1 + 0.1 + 0.1,
            ..PermanentUpgrades::new()
        };

        assert_eq!(upgrades.level(PermanentUpgradeKind::EssenceGain), 3);
    }

    #[test]
    fn event_kind_matches_variant() {
        let event = Event::WaveCompleted {
            wave: 4,
            bonus_gold: 20,
        };

        assert_eq!(event.kind(), EventKind::WaveCompleted);
    }

    #[test]
    fn scaled_cost_floors_the_curve() {
        assert_eq!(scaled_cost(20, 1.5, 0), 20);
        assert_eq!(scaled_cost(20, 1.5, 1), 30);
        assert_eq!(scaled_cost(20, 1.5, 2), 45);
        assert_eq!(scaled_cost(40, 1.5, 3), 135);
        assert_eq!(scaled_cost(10, 1.3, 1), 13);
    }

    #[test]
    fn meta_progress_round_trips_through_bincode() {
        let mut upgrades = PermanentUpgrades::new();
        upgrades.set_level(PermanentUpgradeKind::Bounce, 4);
        upgrades.set_level(PermanentUpgradeKind::EssenceGain, 2);
        assert_round_trip(&MetaProgress::new(125, upgrades));
    }

    #[test]
    fn tower_stats_round_trip_through_bincode() {
        assert_round_trip(&TowerStats::base());
    }

    #[test]
    fn enemy_kind_round_trips_through_bincode() {
        assert_round_trip(&EnemyKind::Splitter);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }
}

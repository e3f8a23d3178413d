#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cost and effect calculators for gold- and essence-funded upgrades.
//!
//! Both systems are pure functions of integer levels. Prices follow
//! `floor(base * scaling^level)`; an upgrade at its configured maximum has no
//! price at all and refuses further purchases without touching the wallet.

pub mod permanent;

use bastion_core::{
    scaled_cost, MiniUpgradeKind, MiniUpgradeLevels, PurchaseError, TowerStats, UpgradeKind,
    UpgradeLevels,
};
use serde::Serialize;

pub use permanent::{
    permanent_info, starting_loadout, PermanentCategory, PermanentUpgradeInfo, StartingLoadout,
};

/// Price curve of a single upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeSpec {
    /// Price of the first level.
    pub base_cost: u64,
    /// Multiplier applied to the price for every level already owned.
    pub scaling: f64,
    /// Highest purchasable level, or `None` when unlimited.
    pub max_level: Option<u32>,
}

impl UpgradeSpec {
    /// Price of the next level when `level` levels are owned.
    #[must_use]
    pub fn cost_at(&self, level: u32) -> Option<u64> {
        match self.max_level {
            Some(max_level) if level >= max_level => None,
            _ => Some(scaled_cost(self.base_cost, self.scaling, level)),
        }
    }

    pub(crate) fn check(&self, level: u32, available: u64) -> Result<u64, PurchaseError> {
        let Some(cost) = self.cost_at(level) else {
            return Err(PurchaseError::MaxLevel {
                max_level: self.max_level.unwrap_or(level),
            });
        };
        if cost > available {
            return Err(PurchaseError::InsufficientFunds { cost, available });
        }
        Ok(cost)
    }
}

/// Price curve of an in-match upgrade.
#[must_use]
pub const fn upgrade_spec(kind: UpgradeKind) -> UpgradeSpec {
    let (base_cost, scaling, max_level) = match kind {
        UpgradeKind::Damage => (20, 1.5, None),
        UpgradeKind::FireRate => (40, 1.5, None),
        UpgradeKind::MaxHealth => (30, 1.5, None),
        UpgradeKind::HealthRegen => (60, 2.0, None),
        UpgradeKind::Range => (35, 1.5, None),
        UpgradeKind::GoldPerRound => (40, 1.6, None),
        UpgradeKind::Interest => (80, 1.8, Some(5)),
    };
    UpgradeSpec {
        base_cost,
        scaling,
        max_level,
    }
}

/// Price curve of a mini upgrade.
#[must_use]
pub const fn mini_upgrade_spec(kind: MiniUpgradeKind) -> UpgradeSpec {
    let base_cost = match kind {
        MiniUpgradeKind::QuickShot => 10,
        MiniUpgradeKind::SharpAmmo => 15,
        MiniUpgradeKind::Bandages => 12,
    };
    UpgradeSpec {
        base_cost,
        scaling: MINI_SCALING,
        max_level: None,
    }
}

const MINI_SCALING: f64 = 1.3;

const DAMAGE_PER_LEVEL: f32 = 5.0;
const FIRE_RATE_PER_LEVEL: f32 = 0.5;
const RANGE_PER_LEVEL: f32 = 25.0;
const MAX_HEALTH_PER_LEVEL: f32 = 20.0;
const GOLD_PER_ROUND_PER_LEVEL: u64 = 15;
const INTEREST_PER_LEVEL: f64 = 0.02;

const QUICK_SHOT_FIRE_RATE: f32 = 0.2;
const SHARP_AMMO_DAMAGE: f32 = 2.0;
const BANDAGES_HEALTH: f32 = 10.0;

/// Outcome of a successful purchase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase<K> {
    /// The upgrade that was bought.
    pub kind: K,
    /// Price that was deducted.
    pub cost: u64,
    /// Level reached by the purchase.
    pub new_level: u32,
    /// Maximum and current health granted immediately by the purchase.
    pub max_health_bonus: f32,
}

/// In-match upgrade levels and the stats derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeSystem {
    starting_stats: TowerStats,
    levels: UpgradeLevels,
    mini: MiniUpgradeLevels,
}

impl UpgradeSystem {
    /// Creates a system with every level at zero on top of `starting_stats`.
    #[must_use]
    pub fn new(starting_stats: TowerStats) -> Self {
        Self {
            starting_stats,
            levels: UpgradeLevels::default(),
            mini: MiniUpgradeLevels::default(),
        }
    }

    /// Price of the next level, or `None` once the maximum level is owned.
    #[must_use]
    pub fn cost(&self, kind: UpgradeKind) -> Option<u64> {
        upgrade_spec(kind).cost_at(self.levels.level(kind))
    }

    /// Reports whether `gold` covers the next level.
    #[must_use]
    pub fn can_afford(&self, kind: UpgradeKind, gold: u64) -> bool {
        self.cost(kind).is_some_and(|cost| cost <= gold)
    }

    /// Buys one level of `kind`, deducting its current price from `gold`.
    ///
    /// # Errors
    ///
    /// Refuses the purchase, leaving `gold` and levels untouched, when the
    /// upgrade is maxed or the price exceeds `gold`.
    pub fn purchase(
        &mut self,
        kind: UpgradeKind,
        gold: &mut u64,
    ) -> Result<Purchase<UpgradeKind>, PurchaseError> {
        let level = self.levels.level_mut(kind);
        let cost = upgrade_spec(kind).check(*level, *gold)?;
        *gold -= cost;
        *level += 1;
        Ok(Purchase {
            kind,
            cost,
            new_level: *level,
            max_health_bonus: if kind == UpgradeKind::MaxHealth {
                MAX_HEALTH_PER_LEVEL
            } else {
                0.0
            },
        })
    }

    /// Price of the next level of a mini upgrade.
    #[must_use]
    pub fn mini_cost(&self, kind: MiniUpgradeKind) -> Option<u64> {
        mini_upgrade_spec(kind).cost_at(self.mini.level(kind))
    }

    /// Reports whether `gold` covers the next level of a mini upgrade.
    #[must_use]
    pub fn can_afford_mini(&self, kind: MiniUpgradeKind, gold: u64) -> bool {
        self.mini_cost(kind).is_some_and(|cost| cost <= gold)
    }

    /// Buys one level of a mini upgrade.
    ///
    /// # Errors
    ///
    /// Refuses the purchase, leaving `gold` and levels untouched, when the
    /// price exceeds `gold`.
    pub fn purchase_mini(
        &mut self,
        kind: MiniUpgradeKind,
        gold: &mut u64,
    ) -> Result<Purchase<MiniUpgradeKind>, PurchaseError> {
        let level = self.mini.level_mut(kind);
        let cost = mini_upgrade_spec(kind).check(*level, *gold)?;
        *gold -= cost;
        *level += 1;
        Ok(Purchase {
            kind,
            cost,
            new_level: *level,
            max_health_bonus: if kind == MiniUpgradeKind::Bandages {
                BANDAGES_HEALTH
            } else {
                0.0
            },
        })
    }

    /// Tower stats derived from the starting stats plus every owned level.
    #[must_use]
    pub fn current_tower_stats(&self) -> TowerStats {
        let base = self.starting_stats;
        TowerStats {
            damage: base.damage
                + DAMAGE_PER_LEVEL * self.levels.damage as f32
                + SHARP_AMMO_DAMAGE * self.mini.sharp_ammo as f32,
            fire_rate: base.fire_rate
                + FIRE_RATE_PER_LEVEL * self.levels.fire_rate as f32
                + QUICK_SHOT_FIRE_RATE * self.mini.quick_shot as f32,
            range: base.range + RANGE_PER_LEVEL * self.levels.range as f32,
            ..base
        }
    }

    /// Health regenerated per second.
    #[must_use]
    pub fn health_regen_rate(&self) -> f32 {
        self.levels.health_regen as f32
    }

    /// Flat gold credited at the end of every wave.
    #[must_use]
    pub fn gold_per_round(&self) -> u64 {
        GOLD_PER_ROUND_PER_LEVEL * u64::from(self.levels.gold_per_round)
    }

    /// Fraction of banked gold paid as interest every second.
    #[must_use]
    pub fn interest_rate(&self) -> f64 {
        INTEREST_PER_LEVEL * f64::from(self.levels.interest)
    }

    /// Levels of the in-match upgrades.
    #[must_use]
    pub fn levels(&self) -> &UpgradeLevels {
        &self.levels
    }

    /// Levels of the mini upgrades.
    #[must_use]
    pub fn mini_levels(&self) -> &MiniUpgradeLevels {
        &self.mini
    }

    /// Stats the match started with, before any in-match level.
    #[must_use]
    pub fn starting_stats(&self) -> &TowerStats {
        &self.starting_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_grow_with_every_level() {
        for kind in UpgradeKind::ALL {
            let spec = upgrade_spec(kind);
            for level in 0..5 {
                let current = spec.cost_at(level).expect("below max");
                let next = spec.cost_at(level + 1);
                if let Some(next) = next {
                    assert!(next > current, "{kind:?} at level {level}");
                }
            }
        }
    }

    #[test]
    fn interest_stops_at_its_max_level() {
        let spec = upgrade_spec(UpgradeKind::Interest);

        assert_eq!(spec.cost_at(4), Some(scaled_cost(80, 1.8, 4)));
        assert_eq!(spec.cost_at(5), None);
        assert_eq!(
            spec.check(5, u64::MAX),
            Err(PurchaseError::MaxLevel { max_level: 5 })
        );
    }

    #[test]
    fn mini_upgrades_share_one_curve() {
        assert_eq!(mini_upgrade_spec(MiniUpgradeKind::QuickShot).cost_at(1), Some(13));
        assert_eq!(mini_upgrade_spec(MiniUpgradeKind::Bandages).cost_at(0), Some(12));
        assert_eq!(mini_upgrade_spec(MiniUpgradeKind::SharpAmmo).max_level, None);
    }
}

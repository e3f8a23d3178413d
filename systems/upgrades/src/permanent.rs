//! Essence-funded permanent upgrades applied when a match is constructed.

use bastion_core::{
    tuning, MetaProgress, PermanentUpgradeKind, PermanentUpgrades, PurchaseError, TowerStats,
};
use serde::Serialize;

use crate::{Purchase, UpgradeSpec};

/// Menu grouping of a permanent upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PermanentCategory {
    /// Improves the tower's firepower.
    Offensive,
    /// Improves the defender's survivability.
    Defensive,
    /// Improves currency income.
    Economic,
}

/// Static description of a permanent upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermanentUpgradeInfo {
    /// The upgrade described.
    pub kind: PermanentUpgradeKind,
    /// Display name.
    pub name: &'static str,
    /// Menu grouping.
    pub category: PermanentCategory,
    /// Price curve and maximum level.
    pub spec: UpgradeSpec,
}

/// Returns the static description of a permanent upgrade.
#[must_use]
pub const fn permanent_info(kind: PermanentUpgradeKind) -> PermanentUpgradeInfo {
    use PermanentCategory::{Defensive, Economic, Offensive};

    let (name, category, base_cost, scaling, max_level) = match kind {
        PermanentUpgradeKind::StartingDamage => ("Starting Damage", Offensive, 10, 1.5, 10),
        PermanentUpgradeKind::StartingFireRate => ("Starting Fire Rate", Offensive, 10, 1.5, 10),
        PermanentUpgradeKind::MultiShot => ("Multi Shot", Offensive, 15, 1.7, 10),
        PermanentUpgradeKind::Bounce => ("Bounce", Offensive, 15, 1.7, 10),
        PermanentUpgradeKind::StartingHealth => ("Starting Health", Defensive, 8, 1.5, 10),
        PermanentUpgradeKind::GoldMultiplier => ("Gold Multiplier", Economic, 20, 2.0, 5),
        PermanentUpgradeKind::EssenceGain => ("Essence Gain", Economic, 30, 2.0, 5),
    };
    PermanentUpgradeInfo {
        kind,
        name,
        category,
        spec: UpgradeSpec {
            base_cost,
            scaling,
            max_level: Some(max_level),
        },
    }
}

/// Essence price of the next level, or `None` once the maximum level is owned.
#[must_use]
pub fn cost(kind: PermanentUpgradeKind, upgrades: &PermanentUpgrades) -> Option<u64> {
    permanent_info(kind).spec.cost_at(upgrades.level(kind))
}

/// Reports whether the record's essence covers the next level.
#[must_use]
pub fn can_afford(kind: PermanentUpgradeKind, meta: &MetaProgress) -> bool {
    cost(kind, &meta.upgrades).is_some_and(|cost| cost <= meta.essence)
}

/// Buys one level of `kind`, spending essence from `meta`.
///
/// # Errors
///
/// Refuses the purchase, leaving the record untouched, when the upgrade is
/// maxed or the price exceeds the essence balance.
pub fn purchase(
    kind: PermanentUpgradeKind,
    meta: &mut MetaProgress,
) -> Result<Purchase<PermanentUpgradeKind>, PurchaseError> {
    let level = meta.upgrades.level(kind);
    let cost = permanent_info(kind).spec.check(level, meta.essence)?;
    meta.essence -= cost;
    meta.upgrades.set_level(kind, level + 1);
    Ok(Purchase {
        kind,
        cost,
        new_level: level + 1,
        max_health_bonus: 0.0,
    })
}

/// Starting conditions of a match derived from the permanent upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartingLoadout {
    /// Tower stats before any in-match upgrade.
    pub tower: TowerStats,
    /// Starting maximum (and current) health.
    pub max_health: f32,
    /// Multiplier applied to kill rewards.
    pub gold_multiplier: f64,
    /// Multiplier applied to essence earned at game over.
    pub essence_gain: f64,
}

/// Computes the starting loadout granted by `upgrades`.
#[must_use]
pub fn starting_loadout(upgrades: &PermanentUpgrades) -> StartingLoadout {
    let base = TowerStats::base();
    StartingLoadout {
        tower: TowerStats {
            damage: base.damage + 2.0 * upgrades.starting_damage as f32,
            fire_rate: base.fire_rate + 0.2 * upgrades.starting_fire_rate as f32,
            multi_shot_count: half_rounded_up(upgrades.multi_shot),
            bounce_count: half_rounded_up(upgrades.bounce),
            ..base
        },
        max_health: tuning::DEFAULT_HEALTH + 10.0 * upgrades.starting_health as f32,
        gold_multiplier: upgrades.gold_multiplier,
        essence_gain: upgrades.essence_gain,
    }
}

const fn half_rounded_up(level: u32) -> u32 {
    level.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_permanent_upgrade_has_a_max_level() {
        let upgrades = PermanentUpgrades::new();
        for kind in PermanentUpgradeKind::ALL {
            assert!(permanent_info(kind).spec.max_level.is_some());
            assert!(cost(kind, &upgrades).is_some());
        }
    }

    #[test]
    fn multiplier_cost_follows_the_recovered_level() {
        let mut upgrades = PermanentUpgrades::new();
        upgrades.set_level(PermanentUpgradeKind::GoldMultiplier, 2);

        assert_eq!(cost(PermanentUpgradeKind::GoldMultiplier, &upgrades), Some(80));

        upgrades.set_level(PermanentUpgradeKind::GoldMultiplier, 5);
        assert_eq!(cost(PermanentUpgradeKind::GoldMultiplier, &upgrades), None);
    }

    #[test]
    fn halves_round_up_for_projectile_counts() {
        assert_eq!(half_rounded_up(0), 0);
        assert_eq!(half_rounded_up(1), 1);
        assert_eq!(half_rounded_up(2), 1);
        assert_eq!(half_rounded_up(3), 2);
    }
}

//! Scripted upgrade choices used by the simulator.

use bastion_core::UpgradeKind;
use bastion_game::GameState;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Highest level the greedy strategy still saves up for.
const GREEDY_LEVEL_CAP: u32 = 10;
/// Wave at which the economic strategy stops investing in income.
const ECONOMIC_LATE_WAVE: u32 = 10;
/// Health fraction below which the adaptive strategy buys sustain.
const ADAPTIVE_LOW_HEALTH: f32 = 0.3;

/// Upgrade strategies selectable from the command line or the config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StrategyName {
    /// Always buys the cheapest affordable upgrade.
    Cheapest,
    /// Prioritises damage output.
    Damage,
    /// Keeps every upgrade at a similar level.
    Balanced,
    /// Prioritises health and regeneration.
    Tank,
    /// Switches focus based on health and wave pressure.
    Adaptive,
    /// Saves up for the most expensive upgrade.
    Greedy,
    /// Invests in income early and defence later.
    Economic,
}

impl StrategyName {
    /// Human readable name used in reports.
    #[must_use]
    pub(crate) const fn label(self) -> &'static str {
        match self {
            StrategyName::Cheapest => "Cheapest First",
            StrategyName::Damage => "Damage Focus",
            StrategyName::Balanced => "Balanced",
            StrategyName::Tank => "Tank",
            StrategyName::Adaptive => "Adaptive",
            StrategyName::Greedy => "Greedy",
            StrategyName::Economic => "Economic Focus",
        }
    }

    /// Creates a fresh strategy instance for a single run.
    #[must_use]
    pub(crate) fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyName::Cheapest => Box::new(Cheapest),
            StrategyName::Damage => Box::new(Priority(&[
                UpgradeKind::Damage,
                UpgradeKind::FireRate,
                UpgradeKind::Range,
                UpgradeKind::MaxHealth,
                UpgradeKind::HealthRegen,
            ])),
            StrategyName::Balanced => Box::new(Balanced),
            StrategyName::Tank => Box::new(Priority(&[
                UpgradeKind::MaxHealth,
                UpgradeKind::HealthRegen,
                UpgradeKind::Damage,
                UpgradeKind::Range,
                UpgradeKind::FireRate,
            ])),
            StrategyName::Adaptive => Box::new(Adaptive),
            StrategyName::Greedy => Box::new(Greedy::default()),
            StrategyName::Economic => Box::new(Economic),
        }
    }
}

/// Upgrades that can still be bought, with their current prices, in menu order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Menu {
    gold: u64,
    prices: Vec<(UpgradeKind, u64)>,
}

impl Menu {
    /// Builds a menu from the wallet and the price of every upgrade.
    ///
    /// Upgrades without a price have reached their maximum level and are left out.
    pub(crate) fn new<I>(gold: u64, prices: I) -> Self
    where
        I: IntoIterator<Item = (UpgradeKind, Option<u64>)>,
    {
        Self {
            gold,
            prices: prices
                .into_iter()
                .filter_map(|(kind, cost)| cost.map(|cost| (kind, cost)))
                .collect(),
        }
    }

    fn price(&self, kind: UpgradeKind) -> Option<u64> {
        self.prices
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, cost)| *cost)
    }

    fn affordable(&self, kind: UpgradeKind) -> bool {
        self.price(kind).is_some_and(|cost| cost <= self.gold)
    }

    fn affordable_prices(&self) -> impl Iterator<Item = (UpgradeKind, u64)> + '_ {
        self.prices
            .iter()
            .copied()
            .filter(|(_, cost)| *cost <= self.gold)
    }

    fn first_affordable(&self, order: &[UpgradeKind]) -> Option<UpgradeKind> {
        order.iter().copied().find(|kind| self.affordable(*kind))
    }

    fn least_levelled(&self, state: &GameState) -> Option<UpgradeKind> {
        self.affordable_prices()
            .min_by_key(|(kind, _)| state.upgrades.level(*kind))
            .map(|(kind, _)| kind)
    }
}

/// Decides which in-match upgrade to buy at each decision point.
pub(crate) trait Strategy {
    /// Returns the upgrade to buy now, or `None` to keep saving.
    fn decide(&mut self, state: &GameState, menu: &Menu) -> Option<UpgradeKind>;
}

struct Cheapest;

impl Strategy for Cheapest {
    fn decide(&mut self, _state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        menu.affordable_prices()
            .min_by_key(|(_, cost)| *cost)
            .map(|(kind, _)| kind)
    }
}

struct Priority(&'static [UpgradeKind]);

impl Strategy for Priority {
    fn decide(&mut self, _state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        menu.first_affordable(self.0)
    }
}

struct Balanced;

impl Strategy for Balanced {
    fn decide(&mut self, state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        menu.least_levelled(state)
    }
}

struct Adaptive;

impl Strategy for Adaptive {
    fn decide(&mut self, state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        if state.health / state.max_health < ADAPTIVE_LOW_HEALTH {
            if let Some(kind) =
                menu.first_affordable(&[UpgradeKind::MaxHealth, UpgradeKind::HealthRegen])
            {
                return Some(kind);
            }
        }

        let offence =
            state.upgrades.damage as f32 + state.upgrades.fire_rate as f32 * 0.5;
        if offence < (state.wave * 2) as f32 {
            if let Some(kind) = menu.first_affordable(&[UpgradeKind::Damage, UpgradeKind::FireRate])
            {
                return Some(kind);
            }
        }

        menu.least_levelled(state)
    }
}

#[derive(Default)]
struct Greedy {
    target: Option<UpgradeKind>,
}

impl Strategy for Greedy {
    fn decide(&mut self, state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        if self.target.is_none() {
            let mut best: Option<(UpgradeKind, u64)> = None;
            for &(kind, cost) in &menu.prices {
                if state.upgrades.level(kind) >= GREEDY_LEVEL_CAP {
                    continue;
                }
                if best.map_or(true, |(_, best_cost)| cost > best_cost) {
                    best = Some((kind, cost));
                }
            }
            self.target = best.map(|(kind, _)| kind);
        }

        let target = self.target?;
        if menu.affordable(target) {
            self.target = None;
            return Some(target);
        }
        None
    }
}

struct Economic;

impl Strategy for Economic {
    fn decide(&mut self, state: &GameState, menu: &Menu) -> Option<UpgradeKind> {
        if state.wave >= ECONOMIC_LATE_WAVE {
            return menu.first_affordable(&[
                UpgradeKind::Damage,
                UpgradeKind::MaxHealth,
                UpgradeKind::FireRate,
                UpgradeKind::Range,
                UpgradeKind::GoldPerRound,
                UpgradeKind::Interest,
                UpgradeKind::HealthRegen,
            ]);
        }

        let levels = state.upgrades;
        [
            UpgradeKind::Interest,
            UpgradeKind::GoldPerRound,
            UpgradeKind::Damage,
            UpgradeKind::MaxHealth,
            UpgradeKind::FireRate,
        ]
        .into_iter()
        .filter(|kind| match kind {
            UpgradeKind::Interest => levels.interest < 3,
            UpgradeKind::GoldPerRound => levels.gold_per_round < 4,
            _ => true,
        })
        .find(|kind| menu.affordable(*kind))
    }
}

//! Death strategies describing what an enemy leaves behind.

use std::fmt;

use bastion_core::{DeathKind, EnemyKilled, EnemyKind, Explosion, SplitSpawn};

use crate::Enemy;

/// Behaviour invoked exactly once when an enemy's health reaches zero.
pub trait DeathStrategy: fmt::Debug {
    /// Builds the enemy-killed notification for `enemy`.
    fn on_death(&self, enemy: &Enemy) -> EnemyKilled;
}

fn killed(enemy: &Enemy, death: DeathKind) -> EnemyKilled {
    EnemyKilled {
        enemy: enemy.id(),
        kind: enemy.kind(),
        position: enemy.position(),
        reward: enemy.reward(),
        death,
        split: None,
        explosion: None,
    }
}

/// Plain death with no aftermath.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalDeath;

impl DeathStrategy for NormalDeath {
    fn on_death(&self, enemy: &Enemy) -> EnemyKilled {
        killed(enemy, DeathKind::Normal)
    }
}

/// Breaks into several smaller enemies at the death location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitterDeath {
    count: u32,
    spawn: EnemyKind,
}

impl SplitterDeath {
    /// Creates a split that yields `count` enemies of kind `spawn`.
    #[must_use]
    pub const fn new(count: u32, spawn: EnemyKind) -> Self {
        Self { count, spawn }
    }
}

impl DeathStrategy for SplitterDeath {
    fn on_death(&self, enemy: &Enemy) -> EnemyKilled {
        EnemyKilled {
            split: Some(SplitSpawn {
                count: self.count,
                kind: self.spawn,
                position: enemy.position(),
            }),
            ..killed(enemy, DeathKind::Splitter)
        }
    }
}

/// Bursts on death, reporting an area for effect collaborators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplodingDeath {
    radius: f32,
    damage: f32,
}

impl ExplodingDeath {
    /// Creates a burst with the provided radius and damage.
    #[must_use]
    pub const fn new(radius: f32, damage: f32) -> Self {
        Self { radius, damage }
    }
}

impl DeathStrategy for ExplodingDeath {
    fn on_death(&self, enemy: &Enemy) -> EnemyKilled {
        EnemyKilled {
            explosion: Some(Explosion {
                position: enemy.position(),
                radius: self.radius,
                damage: self.damage,
            }),
            ..killed(enemy, DeathKind::Exploding)
        }
    }
}

//! Declarative stat blocks for every enemy kind.

use bastion_core::EnemyKind;

use crate::{DeathStrategy, MovementStrategy, NormalDeath, SplitterDeath, StraightMovement};

const HEALTH_SCALING_PER_WAVE: f32 = 1.03;
const SPEED_SCALING_PER_WAVE: f32 = 1.01;
const SPLITTER_SPAWN_COUNT: u32 = 3;

/// Base statistics and spawn behaviour of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyDefinition {
    /// Kind the definition describes.
    pub kind: EnemyKind,
    /// Human readable name.
    pub name: &'static str,
    /// Health at wave one.
    pub health: f32,
    /// Speed at wave one.
    pub speed: f32,
    /// Damage dealt to the tower on contact.
    pub damage: f32,
    /// Gold and score granted for a kill.
    pub reward: u64,
    /// Radius of the enemy's hit circle.
    pub radius: f32,
    /// Enemies produced by one queued spawn.
    pub spawn_group: u32,
}

/// Statistics of an enemy after wave scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledStats {
    /// Scaled health.
    pub health: f32,
    /// Scaled speed.
    pub speed: f32,
    /// Contact damage.
    pub damage: f32,
    /// Kill reward.
    pub reward: u64,
}

const BASIC: EnemyDefinition = EnemyDefinition {
    kind: EnemyKind::Basic,
    name: "Basic",
    health: 15.0,
    speed: 80.0,
    damage: 10.0,
    reward: 5,
    radius: 15.0,
    spawn_group: 1,
};

const SWARM: EnemyDefinition = EnemyDefinition {
    kind: EnemyKind::Swarm,
    name: "Swarm",
    health: 5.0,
    speed: 160.0,
    damage: 5.0,
    reward: 2,
    radius: 8.0,
    spawn_group: 5,
};

const TANK: EnemyDefinition = EnemyDefinition {
    kind: EnemyKind::Tank,
    name: "Tank",
    health: 80.0,
    speed: 40.0,
    damage: 20.0,
    reward: 20,
    radius: 20.0,
    spawn_group: 1,
};

const SPLITTER: EnemyDefinition = EnemyDefinition {
    kind: EnemyKind::Splitter,
    name: "Splitter",
    health: 25.0,
    speed: 80.0,
    damage: 10.0,
    reward: 10,
    radius: 12.0,
    spawn_group: 1,
};

/// Looks up the definition of `kind`.
#[must_use]
pub const fn definition(kind: EnemyKind) -> &'static EnemyDefinition {
    match kind {
        EnemyKind::Basic => &BASIC,
        EnemyKind::Swarm => &SWARM,
        EnemyKind::Tank => &TANK,
        EnemyKind::Splitter => &SPLITTER,
    }
}

impl EnemyDefinition {
    /// Statistics for an enemy spawned during `wave`.
    #[must_use]
    pub fn scaled(&self, wave: u32) -> ScaledStats {
        let exponent = i32::try_from(wave.saturating_sub(1)).unwrap_or(i32::MAX);
        ScaledStats {
            health: self.health * HEALTH_SCALING_PER_WAVE.powi(exponent),
            speed: self.speed * SPEED_SCALING_PER_WAVE.powi(exponent),
            damage: self.damage,
            reward: self.reward,
        }
    }

    /// Movement strategy attached to a fresh enemy of this kind.
    #[must_use]
    pub fn movement(&self, speed: f32) -> Box<dyn MovementStrategy> {
        Box::new(StraightMovement::new(speed))
    }

    /// Death strategy attached to a fresh enemy of this kind.
    #[must_use]
    pub fn death(&self) -> Box<dyn DeathStrategy> {
        match self.kind {
            EnemyKind::Splitter => Box::new(SplitterDeath::new(SPLITTER_SPAWN_COUNT, EnemyKind::Swarm)),
            EnemyKind::Basic | EnemyKind::Swarm | EnemyKind::Tank => Box::new(NormalDeath),
        }
    }
}

//! Pooled attacker advancing on the tower.

use bastion_core::{EnemyKilled, EnemyKind, EntityId, Poolable};
use glam::Vec2;

use crate::{definitions::EnemyDefinition, DeathStrategy, MovementStrategy, Targetable};

/// Pooled attacker.
#[derive(Debug)]
pub struct Enemy {
    id: EntityId,
    kind: EnemyKind,
    position: Vec2,
    radius: f32,
    health: f32,
    max_health: f32,
    speed: f32,
    damage: f32,
    reward: u64,
    active: bool,
    dead: bool,
    last_damaged_at: Option<f32>,
    movement: Option<Box<dyn MovementStrategy>>,
    death: Option<Box<dyn DeathStrategy>>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            id: EntityId::default(),
            kind: EnemyKind::Basic,
            position: Vec2::ZERO,
            radius: 0.0,
            health: 0.0,
            max_health: 0.0,
            speed: 0.0,
            damage: 0.0,
            reward: 0,
            active: false,
            dead: false,
            last_damaged_at: None,
            movement: None,
            death: None,
        }
    }
}

impl Enemy {
    /// Creates an idle enemy ready to be pooled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares a pooled enemy of `definition` at `position` scaled for `wave`.
    pub fn init(&mut self, id: EntityId, definition: &EnemyDefinition, position: Vec2, wave: u32) {
        let stats = definition.scaled(wave);
        self.id = id;
        self.kind = definition.kind;
        self.position = position;
        self.radius = definition.radius;
        self.health = stats.health;
        self.max_health = stats.health;
        self.speed = stats.speed;
        self.damage = stats.damage;
        self.reward = stats.reward;
        self.active = true;
        self.dead = false;
        self.last_damaged_at = None;
        self.movement = Some(definition.movement(stats.speed));
        self.death = Some(definition.death());
    }

    /// Replaces the attached movement strategy.
    pub fn set_movement(&mut self, movement: Box<dyn MovementStrategy>) {
        self.movement = Some(movement);
    }

    /// Replaces the attached death strategy.
    pub fn set_death(&mut self, death: Box<dyn DeathStrategy>) {
        self.death = Some(death);
    }

    /// Moves the enemy one tick toward `target`.
    pub fn update(&mut self, dt: f32, target: Vec2) {
        if !self.active || self.dead {
            return;
        }
        if let Some(movement) = self.movement.as_mut() {
            self.position += movement.update(dt, self.position, target);
        }
    }

    /// Removes up to `amount` health at simulation time `now`.
    ///
    /// Returns the kill notification the first time health reaches zero; later
    /// hits on a dead or idle enemy are ignored.
    pub fn take_damage(&mut self, amount: f32, now: f32) -> Option<EnemyKilled> {
        if !self.active || self.dead {
            return None;
        }
        self.health = (self.health - amount).max(0.0);
        self.last_damaged_at = Some(now);
        if self.health > 0.0 {
            return None;
        }

        self.dead = true;
        let death = self.death.take()?;
        Some(death.on_death(self))
    }

    /// Pool handle assigned when the enemy was spawned.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kind of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Radius of the hit circle.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Scaled movement speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Damage dealt to the tower on contact.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Base kill reward.
    #[must_use]
    pub const fn reward(&self) -> u64 {
        self.reward
    }

    /// Reports whether the enemy is live in its pool.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Reports whether the enemy has died.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Simulation time of the most recent hit.
    #[must_use]
    pub const fn last_damaged_at(&self) -> Option<f32> {
        self.last_damaged_at
    }
}

impl Poolable for Enemy {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl Targetable for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

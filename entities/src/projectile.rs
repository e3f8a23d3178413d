//! Pooled projectile with bounce chaining.

use std::collections::HashSet;

use bastion_core::{tuning, EntityId, Poolable};
use glam::Vec2;

use crate::Targetable;

/// Launch parameters for a projectile drawn from the pool.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSpec {
    /// Launch position.
    pub origin: Vec2,
    /// Point the projectile flies toward; it keeps flying past it.
    pub aim: Vec2,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Distance after which the projectile expires.
    pub range: f32,
    /// Damage applied on hit.
    pub damage: f32,
    /// Remaining bounces.
    pub bounces: u32,
    /// Targets this projectile lineage already hit.
    pub visited: HashSet<EntityId>,
}

/// Pooled projectile travelling in a straight line.
#[derive(Debug, Default)]
pub struct Projectile {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    damage: f32,
    max_distance: f32,
    distance_traveled: f32,
    bounces: u32,
    visited: HashSet<EntityId>,
    chained: bool,
    active: bool,
    destroyed: bool,
}

impl Projectile {
    /// Creates an idle projectile ready to be pooled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches a pooled projectile.
    pub fn init(&mut self, id: EntityId, spec: ProjectileSpec, chained: bool) {
        self.id = id;
        self.position = spec.origin;
        self.velocity = (spec.aim - spec.origin).normalize_or_zero() * spec.speed;
        self.speed = spec.speed;
        self.damage = spec.damage;
        self.max_distance = spec.range;
        self.distance_traveled = 0.0;
        self.bounces = spec.bounces;
        self.visited = spec.visited;
        self.chained = chained;
        self.active = true;
        self.destroyed = false;
    }

    /// Advances the projectile, destroying it at max range or out of bounds.
    pub fn update(&mut self, dt: f32) {
        if self.destroyed {
            return;
        }
        let step = self.velocity * dt;
        self.position += step;
        self.distance_traveled += step.length();

        let min = -tuning::PROJECTILE_BOUNDS_MARGIN;
        let max = tuning::ARENA_SIZE + tuning::PROJECTILE_BOUNDS_MARGIN;
        let out_of_bounds = self.position.x < min
            || self.position.x > max
            || self.position.y < min
            || self.position.y > max;
        if self.distance_traveled >= self.max_distance || out_of_bounds {
            self.destroy();
        }
    }

    /// Reports whether the projectile currently overlaps `target`.
    #[must_use]
    pub fn check_collision<T: Targetable>(&self, target: &T) -> bool {
        if self.destroyed || !target.is_targetable() || self.visited.contains(&target.id()) {
            return false;
        }
        self.position.distance(target.position())
            < target.radius() + tuning::PROJECTILE_COLLISION_RADIUS
    }

    /// Resolves a hit on `target` and destroys the projectile.
    ///
    /// With bounces left, the nearest unvisited targetable candidate strictly
    /// inside the chain radius receives a follow-up projectile; its launch
    /// parameters are returned for the owner to spawn.
    pub fn on_hit<'a, T, I>(&mut self, target: &T, candidates: I) -> Option<ProjectileSpec>
    where
        T: Targetable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let _ = self.visited.insert(target.id());
        let chain = if self.bounces > 0 {
            self.nearest_unvisited(candidates).map(|next| ProjectileSpec {
                origin: self.position,
                aim: next,
                speed: self.speed,
                range: tuning::CHAIN_RADIUS,
                damage: self.damage * tuning::CHAIN_DAMAGE_FACTOR,
                bounces: self.bounces - 1,
                visited: self.visited.clone(),
            })
        } else {
            None
        };
        self.destroy();
        chain
    }

    fn nearest_unvisited<'a, T, I>(&self, candidates: I) -> Option<Vec2>
    where
        T: Targetable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut nearest: Option<(Vec2, f32)> = None;
        for candidate in candidates {
            if !candidate.is_targetable() || self.visited.contains(&candidate.id()) {
                continue;
            }
            let distance = self.position.distance(candidate.position());
            if distance >= tuning::CHAIN_RADIUS {
                continue;
            }
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((candidate.position(), distance)),
            }
        }
        nearest.map(|(position, _)| position)
    }

    /// Marks the projectile spent.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Pool handle assigned at launch.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in world units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Damage applied on hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Remaining bounces.
    #[must_use]
    pub const fn bounces(&self) -> u32 {
        self.bounces
    }

    /// Distance covered since launch.
    #[must_use]
    pub const fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Reports whether the projectile came from a bounce.
    #[must_use]
    pub const fn is_chained(&self) -> bool {
        self.chained
    }

    /// Reports whether `target` was already hit by this projectile lineage.
    #[must_use]
    pub fn has_visited(&self, target: EntityId) -> bool {
        self.visited.contains(&target)
    }

    /// Reports whether the projectile is spent.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Reports whether the projectile is live in its pool.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        let mut visited = std::mem::take(&mut self.visited);
        visited.clear();
        *self = Self::default();
        self.visited = visited;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

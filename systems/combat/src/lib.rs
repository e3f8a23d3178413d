#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower targeting and projectile firing.
//!
//! The combat system owns the projectile pool. Every projectile it launches is
//! announced with [`Event::ProjectileSpawned`]; the orchestrator tracks the
//! live list from those notifications and hands spent projectiles back through
//! [`CombatSystem::release`].

use bastion_core::{tuning, EntityId, Event, Pool};
use bastion_entities::{Projectile, ProjectileSpec, Targetable, Tower};
use glam::Vec2;
use tracing::trace;

/// Fires salvos from the tower at the nearest enemy in range.
#[derive(Debug)]
pub struct CombatSystem {
    fire_timer: f32,
    projectiles: Pool<Projectile>,
}

impl Default for CombatSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatSystem {
    /// Creates a combat system with a pre-filled projectile pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fire_timer: 0.0,
            projectiles: Pool::new(Projectile::new, tuning::PROJECTILE_POOL_PREFILL),
        }
    }

    /// Advances the fire timer and fires a salvo when one is due and a target exists.
    pub fn update<'a, T, I>(&mut self, dt: f32, tower: &Tower, candidates: I, out: &mut Vec<Event>)
    where
        T: Targetable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.fire_timer += dt;
        let fire_rate = tower.stats().fire_rate;
        if fire_rate <= 0.0 || self.fire_timer < 1.0 / fire_rate {
            return;
        }

        let Some(target) = tower.find_nearest_target(candidates) else {
            return;
        };
        self.fire(tower, target.position(), out);
        self.fire_timer = 0.0;
    }

    /// Launches one salvo from `tower` aimed at `target`.
    ///
    /// Extra projectiles fan out symmetrically around the primary aim line and
    /// keep the distance to the target.
    pub fn fire(&mut self, tower: &Tower, target: Vec2, out: &mut Vec<Event>) {
        let stats = *tower.stats();
        let origin = tower.position();
        let offset = target - origin;
        let angle = offset.y.atan2(offset.x);
        let distance = offset.length();
        let extra = stats.multi_shot_count;

        out.push(Event::TowerShoot {
            position: origin,
            angle,
            is_multi_shot: extra > 0,
        });

        for index in 0..=extra {
            let spread = if extra > 0 {
                (index as f32 - extra as f32 / 2.0) * tuning::MULTI_SHOT_SPREAD
            } else {
                0.0
            };
            let heading = angle + spread;
            let aim = origin + Vec2::new(heading.cos(), heading.sin()) * distance;
            let spec = ProjectileSpec {
                origin,
                aim,
                speed: stats.projectile_speed,
                range: stats.range,
                damage: stats.damage,
                bounces: stats.bounce_count,
                visited: Default::default(),
            };
            let _ = self.launch(spec, false, out);
        }
        trace!(projectiles = extra + 1, angle, "tower fired");
    }

    /// Launches a chained projectile produced by a bounce.
    pub fn spawn_chain(&mut self, spec: ProjectileSpec, out: &mut Vec<Event>) -> EntityId {
        self.launch(spec, true, out)
    }

    fn launch(&mut self, spec: ProjectileSpec, chained: bool, out: &mut Vec<Event>) -> EntityId {
        let position = spec.origin;
        let id = self
            .projectiles
            .acquire_with(|id, projectile| projectile.init(id, spec, chained));
        out.push(Event::ProjectileSpawned {
            projectile: id,
            position,
            chained,
        });
        id
    }

    /// Shared access to a live projectile.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(id)
    }

    /// Exclusive access to a live projectile.
    pub fn projectile_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(id)
    }

    /// Returns a projectile to the pool, reporting whether it was live.
    pub fn release(&mut self, id: EntityId) -> bool {
        self.projectiles.release(id)
    }

    /// Returns every live projectile to the pool and rewinds the fire timer.
    pub fn reset(&mut self) -> usize {
        self.fire_timer = 0.0;
        self.projectiles.release_all()
    }

    /// Number of projectiles currently drawn from the pool.
    #[must_use]
    pub fn active_projectiles(&self) -> usize {
        self.projectiles.active_count()
    }

    /// Number of projectiles the pool ever created.
    #[must_use]
    pub fn pooled_projectiles(&self) -> usize {
        self.projectiles.total_created()
    }

    /// Seconds accumulated since the last salvo.
    #[must_use]
    pub fn fire_timer(&self) -> f32 {
        self.fire_timer
    }
}

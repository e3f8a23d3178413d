#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pooled gameplay entities and the strategies attached to them.
//!
//! Entities are plain state plus behaviour. They never reference one another;
//! every cross-entity interaction receives the data it needs as arguments and
//! reports its outcome as a return value the owning system turns into events.

pub mod death;
pub mod definitions;
pub mod enemy;
pub mod movement;
pub mod projectile;
pub mod tower;

use bastion_core::EntityId;
use glam::Vec2;

pub use death::{DeathStrategy, ExplodingDeath, NormalDeath, SplitterDeath};
pub use definitions::{definition, EnemyDefinition, ScaledStats};
pub use enemy::Enemy;
pub use movement::{DashMovement, MovementStrategy, StraightMovement, ZigzagMovement};
pub use projectile::{Projectile, ProjectileSpec};
pub use tower::Tower;

/// Anything the tower can aim at and projectiles can collide with.
pub trait Targetable {
    /// Pool handle identifying the target across frames.
    fn id(&self) -> EntityId;

    /// Current centre of the target.
    fn position(&self) -> Vec2;

    /// Radius of the target's hit circle.
    fn radius(&self) -> f32;

    /// Reports whether the target is live in its pool.
    fn is_active(&self) -> bool;

    /// Reports whether the target has already died.
    fn is_dead(&self) -> bool;

    /// Reports whether the target can still be aimed at or hit.
    fn is_targetable(&self) -> bool {
        self.is_active() && !self.is_dead()
    }
}

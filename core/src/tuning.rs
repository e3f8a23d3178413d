//! Gameplay constants shared by every system.

use glam::Vec2;

/// Width and height of the square arena in world units.
pub const ARENA_SIZE: f32 = 800.0;
/// Centre of the arena, where the tower stands.
pub const ARENA_CENTER: Vec2 = Vec2::new(ARENA_SIZE / 2.0, ARENA_SIZE / 2.0);
/// Distance from the arena centre at which enemies appear.
pub const ENEMY_SPAWN_DISTANCE: f32 = 600.0;

/// Radius of the tower's hit circle.
pub const TOWER_RADIUS: f32 = 30.0;
/// Damage of an unupgraded tower.
pub const BASE_TOWER_DAMAGE: f32 = 10.0;
/// Shots per second of an unupgraded tower.
pub const BASE_TOWER_FIRE_RATE: f32 = 2.0;
/// Targeting range of an unupgraded tower.
pub const BASE_TOWER_RANGE: f32 = 200.0;
/// Projectile speed of an unupgraded tower.
pub const BASE_PROJECTILE_SPEED: f32 = 300.0;

/// Gold available when a match starts.
pub const STARTING_GOLD: u64 = 25;
/// Health of the defender before permanent upgrades.
pub const DEFAULT_HEALTH: f32 = 100.0;
/// Fraction of the final score converted into essence.
pub const ESSENCE_CONVERSION_RATE: f64 = 0.15;

/// Extra radius added to a target's radius when testing projectile hits.
pub const PROJECTILE_COLLISION_RADIUS: f32 = 5.0;
/// Distance outside the arena after which projectiles are discarded.
pub const PROJECTILE_BOUNDS_MARGIN: f32 = 100.0;
/// Maximum distance a bounce may travel to its next target.
pub const CHAIN_RADIUS: f32 = 150.0;
/// Damage factor applied to every chained projectile.
pub const CHAIN_DAMAGE_FACTOR: f32 = 0.8;
/// Angular gap in radians between adjacent projectiles of a salvo.
pub const MULTI_SHOT_SPREAD: f32 = 0.15;

/// Kills needed inside the streak window to trigger the damage bonus.
pub const KILL_STREAK_THRESHOLD: u32 = 5;
/// Seconds a kill keeps the streak alive.
pub const KILL_STREAK_WINDOW: f32 = 3.0;
/// Damage multiplier granted by an active kill streak.
pub const KILL_STREAK_DAMAGE_MULTIPLIER: f32 = 1.5;
/// Seconds the kill streak damage bonus lasts.
pub const KILL_STREAK_DURATION: f32 = 5.0;

/// Fire rate multiplier of the speed boost ability.
pub const SPEED_BOOST_MULTIPLIER: f32 = 2.0;
/// Seconds the speed boost lasts.
pub const SPEED_BOOST_DURATION: f32 = 3.0;
/// Seconds before the speed boost can be used again.
pub const SPEED_BOOST_COOLDOWN: f32 = 10.0;

/// Bonus gold factor for a wave cleared without losing health.
pub const PERFECT_WAVE_MULTIPLIER: f64 = 1.5;
/// Seconds before the first wave starts.
pub const FIRST_WAVE_DELAY: f32 = 2.0;
/// Seconds between a completed wave and the next one.
pub const NEXT_WAVE_DELAY: f32 = 3.0;

/// Radius of the circle split spawns are placed on.
pub const SPLIT_SPAWN_RADIUS: f32 = 20.0;
/// Radius of the circle group spawns are placed on.
pub const SPAWN_GROUP_RADIUS: f32 = 20.0;

/// Enemies created up front by the wave system's pool.
pub const ENEMY_POOL_PREFILL: usize = 100;
/// Projectiles created up front by the combat system's pool.
pub const PROJECTILE_POOL_PREFILL: usize = 50;

use std::collections::HashSet;

use bastion_core::{tuning, DeathKind, EnemyKind, EntityId, Poolable};
use bastion_entities::{definition, Enemy, ExplodingDeath, Projectile, ProjectileSpec};
use glam::Vec2;

#[test]
fn take_damage_clamps_health_and_reports_death_once() {
    let mut enemy = spawn(0, EnemyKind::Basic, Vec2::new(100.0, 100.0));

    assert!(enemy.take_damage(10.0, 1.0).is_none());
    assert_eq!(enemy.health(), 5.0);

    let killed = enemy.take_damage(40.0, 2.0).expect("enemy should die");
    assert_eq!(enemy.health(), 0.0);
    assert!(enemy.is_dead());
    assert_eq!(killed.enemy, EntityId::new(0, 0));
    assert_eq!(killed.death, DeathKind::Normal);
    assert_eq!(killed.reward, 5);
    assert!(killed.split.is_none());
    assert_eq!(enemy.last_damaged_at(), Some(2.0));

    assert!(enemy.take_damage(40.0, 3.0).is_none());
}

#[test]
fn splitter_death_requests_swarm_replacements() {
    let position = Vec2::new(250.0, 320.0);
    let mut enemy = spawn(3, EnemyKind::Splitter, position);

    let killed = enemy.take_damage(1_000.0, 0.0).expect("splitter should die");
    let split = killed.split.expect("split data");

    assert_eq!(killed.death, DeathKind::Splitter);
    assert_eq!(split.count, 3);
    assert_eq!(split.kind, EnemyKind::Swarm);
    assert_eq!(split.position, position);
}

#[test]
fn replaced_death_strategy_reports_explosions() {
    let mut enemy = spawn(1, EnemyKind::Tank, Vec2::new(10.0, 10.0));
    enemy.set_death(Box::new(ExplodingDeath::new(40.0, 12.0)));

    let killed = enemy.take_damage(500.0, 0.0).expect("tank should die");

    assert_eq!(killed.death, DeathKind::Exploding);
    let explosion = killed.explosion.expect("explosion data");
    assert_eq!(explosion.radius, 40.0);
}

#[test]
fn reset_leaves_enemy_idle_with_zero_health() {
    let mut enemy = spawn(2, EnemyKind::Tank, Vec2::ZERO);
    enemy.reset();

    assert!(!enemy.is_active());
    assert_eq!(enemy.health(), 0.0);
    assert!(enemy.take_damage(1.0, 0.0).is_none());
}

#[test]
fn enemies_walk_toward_the_tower() {
    let start = tuning::ARENA_CENTER + Vec2::new(300.0, 0.0);
    let mut enemy = spawn(0, EnemyKind::Basic, start);

    enemy.update(1.0, tuning::ARENA_CENTER);

    assert!((enemy.position().x - (start.x - 80.0)).abs() < 1e-3);
    assert_eq!(enemy.position().y, start.y);
}

#[test]
fn projectile_never_hits_the_same_target_twice() {
    let enemy = spawn(0, EnemyKind::Tank, Vec2::new(100.0, 100.0));
    let mut projectile = launch(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0), 1);

    assert!(projectile.check_collision(&enemy));
    let chain = projectile.on_hit(&enemy, [&enemy]);

    assert!(chain.is_none());
    assert!(projectile.is_destroyed());
    assert!(projectile.has_visited(enemy.id()));
    assert!(!projectile.check_collision(&enemy));
}

#[test]
fn bounce_spawns_one_weaker_chain_and_carries_visited_targets() {
    let first = spawn(0, EnemyKind::Tank, Vec2::new(100.0, 100.0));
    let second = spawn(1, EnemyKind::Tank, Vec2::new(200.0, 100.0));
    let far = spawn(2, EnemyKind::Tank, Vec2::new(100.0, 400.0));
    let mut projectile = launch(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0), 1);

    let chain = projectile
        .on_hit(&first, [&first, &second, &far])
        .expect("second enemy is inside the chain radius");

    assert!(projectile.is_destroyed());
    assert_eq!(chain.damage, 20.0 * 0.8);
    assert_eq!(chain.bounces, 0);
    assert_eq!(chain.aim, second.position());
    assert_eq!(chain.range, tuning::CHAIN_RADIUS);
    assert!(chain.visited.contains(&first.id()));

    let mut chained = Projectile::new();
    chained.init(EntityId::new(9, 0), chain, true);
    assert!(chained.is_chained());
    assert!(!chained.check_collision(&first));
    assert!(chained.has_visited(first.id()));
}

#[test]
fn chain_ignores_targets_at_or_beyond_the_radius() {
    let first = spawn(0, EnemyKind::Tank, Vec2::new(100.0, 100.0));
    let edge = spawn(1, EnemyKind::Tank, Vec2::new(250.0, 100.0));
    let mut projectile = launch(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0), 2);

    assert!(projectile.on_hit(&first, [&first, &edge]).is_none());
    assert!(projectile.is_destroyed());
}

#[test]
fn projectile_expires_at_max_range() {
    let mut projectile = launch(Vec2::new(400.0, 400.0), Vec2::new(500.0, 400.0), 0);

    projectile.update(0.5);
    assert!(!projectile.is_destroyed());
    projectile.update(0.2);
    assert!(projectile.is_destroyed());
}

#[test]
fn projectile_expires_outside_the_arena_margin() {
    let mut projectile = Projectile::new();
    projectile.init(
        EntityId::new(0, 0),
        ProjectileSpec {
            origin: Vec2::new(-95.0, 400.0),
            aim: Vec2::new(-200.0, 400.0),
            speed: 300.0,
            range: 10_000.0,
            damage: 1.0,
            bounces: 0,
            visited: HashSet::new(),
        },
        false,
    );

    projectile.update(0.1);

    assert!(projectile.is_destroyed());
}

fn spawn(index: u32, kind: EnemyKind, position: Vec2) -> Enemy {
    let mut enemy = Enemy::new();
    enemy.set_active(true);
    enemy.init(EntityId::new(index, 0), definition(kind), position, 1);
    enemy
}

fn launch(origin: Vec2, aim: Vec2, bounces: u32) -> Projectile {
    let mut projectile = Projectile::new();
    projectile.init(
        EntityId::new(100, 0),
        ProjectileSpec {
            origin,
            aim,
            speed: 300.0,
            range: 200.0,
            damage: 20.0,
            bounces,
            visited: HashSet::new(),
        },
        false,
    );
    projectile
}

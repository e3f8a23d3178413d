use std::collections::HashSet;

use bastion_core::{tuning, EnemyKind, EntityId, Event, TowerStats};
use bastion_entities::{definition, Enemy, Tower};
use bastion_system_combat::CombatSystem;
use glam::Vec2;

#[test]
fn holds_fire_until_the_interval_elapses() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats::base());
    let enemies = [enemy_at(0, Vec2::new(120.0, 0.0))];
    let mut events = Vec::new();

    combat.update(0.25, &tower, &enemies, &mut events);
    assert!(events.is_empty());

    combat.update(0.25, &tower, &enemies, &mut events);
    assert_eq!(shots(&events), 1);
    assert_eq!(spawned(&events).len(), 1);
    assert_eq!(combat.fire_timer(), 0.0);
}

#[test]
fn keeps_charge_while_no_target_is_in_range() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats::base());
    let far = [enemy_at(0, Vec2::new(350.0, 0.0))];
    let near = [enemy_at(1, Vec2::new(50.0, 0.0))];
    let mut events = Vec::new();

    combat.update(2.0, &tower, &far, &mut events);
    assert!(events.is_empty());

    combat.update(0.01, &tower, &near, &mut events);
    assert_eq!(shots(&events), 1);
}

#[test]
fn multi_shot_fires_distinct_projectiles_and_flags_the_salvo() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats {
        multi_shot_count: 2,
        ..TowerStats::base()
    });
    let mut events = Vec::new();

    combat.fire(&tower, tuning::ARENA_CENTER + Vec2::new(100.0, 0.0), &mut events);

    let ids = spawned(&events);
    let unique: HashSet<EntityId> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(unique.len(), 3);
    assert_eq!(combat.active_projectiles(), 3);
    assert!(matches!(
        events.first(),
        Some(Event::TowerShoot {
            is_multi_shot: true,
            ..
        })
    ));
}

#[test]
fn salvo_spreads_symmetrically_around_the_aim_line() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats {
        multi_shot_count: 2,
        ..TowerStats::base()
    });
    let mut events = Vec::new();

    combat.fire(&tower, tuning::ARENA_CENTER + Vec2::new(100.0, 0.0), &mut events);

    let headings: Vec<f32> = spawned(&events)
        .into_iter()
        .map(|id| {
            let velocity = combat.projectile(id).expect("live projectile").velocity();
            velocity.y.atan2(velocity.x)
        })
        .collect();
    assert!((headings[0] + tuning::MULTI_SHOT_SPREAD).abs() < 1e-4);
    assert!(headings[1].abs() < 1e-4);
    assert!((headings[2] - tuning::MULTI_SHOT_SPREAD).abs() < 1e-4);
}

#[test]
fn projectiles_inherit_the_tower_stats() {
    let mut combat = CombatSystem::new();
    let stats = TowerStats {
        damage: 33.0,
        bounce_count: 2,
        ..TowerStats::base()
    };
    let tower = Tower::new(stats);
    let mut events = Vec::new();

    combat.fire(&tower, tuning::ARENA_CENTER + Vec2::new(0.0, 80.0), &mut events);

    let id = spawned(&events)[0];
    let projectile = combat.projectile(id).expect("live projectile");
    assert_eq!(projectile.damage(), 33.0);
    assert_eq!(projectile.bounces(), 2);
    assert!((projectile.velocity().length() - stats.projectile_speed).abs() < 1e-3);
    assert!(matches!(
        events.first(),
        Some(Event::TowerShoot {
            is_multi_shot: false,
            ..
        })
    ));
}

#[test]
fn released_projectiles_return_to_the_pool_once() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats::base());
    let mut events = Vec::new();
    combat.fire(&tower, tuning::ARENA_CENTER + Vec2::new(60.0, 0.0), &mut events);
    let id = spawned(&events)[0];

    assert!(combat.release(id));
    assert!(!combat.release(id));
    assert_eq!(combat.active_projectiles(), 0);
    assert!(combat.projectile(id).is_none());
}

#[test]
fn reset_drains_every_projectile() {
    let mut combat = CombatSystem::new();
    let tower = Tower::new(TowerStats {
        multi_shot_count: 4,
        ..TowerStats::base()
    });
    let mut events = Vec::new();
    combat.fire(&tower, tuning::ARENA_CENTER + Vec2::new(60.0, 0.0), &mut events);

    assert_eq!(combat.reset(), 5);
    assert_eq!(combat.active_projectiles(), 0);
}

fn enemy_at(index: u32, offset: Vec2) -> Enemy {
    let mut enemy = Enemy::new();
    enemy.init(
        EntityId::new(index, 0),
        definition(EnemyKind::Basic),
        tuning::ARENA_CENTER + offset,
        1,
    );
    enemy
}

fn shots(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::TowerShoot { .. }))
        .count()
}

fn spawned(events: &[Event]) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ProjectileSpawned { projectile, .. } => Some(*projectile),
            _ => None,
        })
        .collect()
}

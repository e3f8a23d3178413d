use bastion_core::{
    MetaProgress, MiniUpgradeKind, PermanentUpgradeKind, PermanentUpgrades, PurchaseError,
    TowerStats, UpgradeKind,
};
use bastion_system_upgrades::{permanent, starting_loadout, UpgradeSystem};

#[test]
fn purchase_deducts_the_current_cost_and_adds_one_level() {
    let mut upgrades = UpgradeSystem::new(TowerStats::base());
    let mut gold = 100;

    let purchase = upgrades
        .purchase(UpgradeKind::Damage, &mut gold)
        .expect("affordable");

    assert_eq!(purchase.cost, 20);
    assert_eq!(purchase.new_level, 1);
    assert_eq!(gold, 80);
    assert_eq!(upgrades.levels().damage, 1);
    assert_eq!(upgrades.cost(UpgradeKind::Damage), Some(30));
}

#[test]
fn refused_purchase_leaves_gold_and_levels_alone() {
    let mut upgrades = UpgradeSystem::new(TowerStats::base());
    let mut gold = 19;

    for _ in 0..3 {
        assert_eq!(
            upgrades.purchase(UpgradeKind::Damage, &mut gold),
            Err(PurchaseError::InsufficientFunds {
                cost: 20,
                available: 19
            })
        );
    }

    assert_eq!(gold, 19);
    assert_eq!(upgrades.levels().damage, 0);
    assert!(!upgrades.can_afford(UpgradeKind::Damage, gold));
}

#[test]
fn interest_refuses_purchases_past_level_five() {
    let mut upgrades = UpgradeSystem::new(TowerStats::base());
    let mut gold = u64::MAX / 2;
    for _ in 0..5 {
        let _ = upgrades
            .purchase(UpgradeKind::Interest, &mut gold)
            .expect("below max");
    }
    let before = gold;

    assert_eq!(upgrades.cost(UpgradeKind::Interest), None);
    assert!(!upgrades.can_afford(UpgradeKind::Interest, gold));
    assert_eq!(
        upgrades.purchase(UpgradeKind::Interest, &mut gold),
        Err(PurchaseError::MaxLevel { max_level: 5 })
    );
    assert_eq!(gold, before);
    assert!((upgrades.interest_rate() - 0.1).abs() < 1e-12);
}

#[test]
fn tower_stats_are_recomputed_from_the_starting_stats() {
    let starting = TowerStats {
        damage: 14.0,
        multi_shot_count: 1,
        ..TowerStats::base()
    };
    let mut upgrades = UpgradeSystem::new(starting);
    let mut gold = 10_000;
    let _ = upgrades.purchase(UpgradeKind::Damage, &mut gold).expect("buy");
    let _ = upgrades.purchase(UpgradeKind::Damage, &mut gold).expect("buy");
    let _ = upgrades.purchase(UpgradeKind::FireRate, &mut gold).expect("buy");
    let _ = upgrades.purchase(UpgradeKind::Range, &mut gold).expect("buy");
    let _ = upgrades
        .purchase_mini(MiniUpgradeKind::SharpAmmo, &mut gold)
        .expect("buy");
    let _ = upgrades
        .purchase_mini(MiniUpgradeKind::QuickShot, &mut gold)
        .expect("buy");

    let stats = upgrades.current_tower_stats();

    assert_eq!(stats.damage, 14.0 + 10.0 + 2.0);
    assert!((stats.fire_rate - 2.7).abs() < 1e-5);
    assert_eq!(stats.range, 225.0);
    assert_eq!(stats.multi_shot_count, 1);
    assert_eq!(stats.projectile_speed, starting.projectile_speed);
}

#[test]
fn health_purchases_report_their_bonus() {
    let mut upgrades = UpgradeSystem::new(TowerStats::base());
    let mut gold = 1_000;

    let max_health = upgrades
        .purchase(UpgradeKind::MaxHealth, &mut gold)
        .expect("buy");
    let bandages = upgrades
        .purchase_mini(MiniUpgradeKind::Bandages, &mut gold)
        .expect("buy");
    let regen = upgrades
        .purchase(UpgradeKind::HealthRegen, &mut gold)
        .expect("buy");

    assert_eq!(max_health.max_health_bonus, 20.0);
    assert_eq!(bandages.max_health_bonus, 10.0);
    assert_eq!(regen.max_health_bonus, 0.0);
    assert_eq!(upgrades.health_regen_rate(), 1.0);
}

#[test]
fn gold_per_round_adds_fifteen_per_level() {
    let mut upgrades = UpgradeSystem::new(TowerStats::base());
    let mut gold = 1_000;
    let _ = upgrades
        .purchase(UpgradeKind::GoldPerRound, &mut gold)
        .expect("buy");
    let _ = upgrades
        .purchase(UpgradeKind::GoldPerRound, &mut gold)
        .expect("buy");

    assert_eq!(upgrades.gold_per_round(), 30);
    assert_eq!(gold, 1_000 - 40 - 64);
}

#[test]
fn permanent_purchase_spends_essence_and_encodes_multipliers() {
    let mut meta = MetaProgress::new(100, PermanentUpgrades::new());

    let purchase =
        permanent::purchase(PermanentUpgradeKind::EssenceGain, &mut meta).expect("affordable");

    assert_eq!(purchase.cost, 30);
    assert_eq!(purchase.new_level, 1);
    assert_eq!(meta.essence, 70);
    assert!((meta.upgrades.essence_gain - 1.1).abs() < 1e-9);
    assert_eq!(
        permanent::cost(PermanentUpgradeKind::EssenceGain, &meta.upgrades),
        Some(60)
    );
    assert!(!permanent::can_afford(PermanentUpgradeKind::EssenceGain, &meta));
}

#[test]
fn maxed_permanent_upgrade_is_refused() {
    let mut upgrades = PermanentUpgrades::new();
    upgrades.set_level(PermanentUpgradeKind::Bounce, 10);
    let mut meta = MetaProgress::new(1_000_000, upgrades);

    assert_eq!(
        permanent::purchase(PermanentUpgradeKind::Bounce, &mut meta),
        Err(PurchaseError::MaxLevel { max_level: 10 })
    );
    assert_eq!(meta.essence, 1_000_000);
}

#[test]
fn loadout_applies_every_permanent_level() {
    let upgrades = PermanentUpgrades {
        starting_damage: 3,
        starting_fire_rate: 5,
        starting_health: 2,
        gold_multiplier: 1.2,
        essence_gain: 1.0,
        multi_shot: 3,
        bounce: 1,
    };

    let loadout = starting_loadout(&upgrades);

    assert_eq!(loadout.tower.damage, 16.0);
    assert!((loadout.tower.fire_rate - 3.0).abs() < 1e-5);
    assert_eq!(loadout.tower.multi_shot_count, 2);
    assert_eq!(loadout.tower.bounce_count, 1);
    assert_eq!(loadout.max_health, 120.0);
    assert!((loadout.gold_multiplier - 1.2).abs() < 1e-12);
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match orchestrator for the Bastion simulation.
//!
//! [`Game`] owns every system and advances them in a fixed order on each
//! [`Game::update`]. Systems report side effects as [`Event`]s; the game
//! publishes each one immediately, first to its own reactions (wave
//! tracking, then the economy) and then to the external subscribers on the
//! per-match [`EventBus`]. Events caused by those reactions are published
//! right after the event that triggered them.

pub mod state;

use std::collections::HashSet;
use std::time::Duration;

use bastion_core::{
    tuning, EnemyKilled, EntityId, Event, EventBus, MetaProgress, MiniUpgradeKind,
    PermanentUpgradeKind, PermanentUpgrades, Purchasable, PurchaseError, UpgradeKind,
};
use bastion_entities::{Enemy, Projectile, Targetable, Tower};
use bastion_system_combat::CombatSystem;
use bastion_system_effects::TemporaryEffects;
use bastion_system_upgrades::{permanent, starting_loadout, Purchase, UpgradeSystem};
use bastion_system_waves::{Config as WaveConfig, WaveSystem};
use tracing::{info, warn};

pub use state::{AbilityState, EconomyState, GameState, KillStreakState};

/// Parameters fixed for the lifetime of one match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    seed: u64,
    meta: MetaProgress,
}

impl MatchConfig {
    /// Creates a configuration with no permanent progress.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            meta: MetaProgress::new(0, PermanentUpgrades::new()),
        }
    }

    /// Supplies the persisted meta-progression record.
    #[must_use]
    pub const fn with_meta(mut self, meta: MetaProgress) -> Self {
        self.meta = meta;
        self
    }

    /// Seed from which every random stream of the match is derived.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Meta-progression record the match starts from.
    #[must_use]
    pub const fn meta(&self) -> &MetaProgress {
        &self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EffectKey {
    SpeedBoost,
    KillStreak,
}

/// Everything a temporary effect may restore on expiry.
#[derive(Debug)]
struct Keep {
    tower: Tower,
    state: GameState,
}

/// A single match: the defender, its systems, and the event bus.
#[derive(Debug)]
pub struct Game {
    keep: Keep,
    meta: MetaProgress,
    projectiles: Vec<EntityId>,
    waves: WaveSystem,
    combat: CombatSystem,
    upgrades: UpgradeSystem,
    effects: TemporaryEffects<EffectKey, Keep>,
    bus: EventBus,
    last_essence: Option<u64>,
    duplicate_projectiles: u64,
}

impl Game {
    /// Starts a match, applying the permanent upgrades of `config`.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let meta = config.meta;
        let loadout = starting_loadout(&meta.upgrades);
        let waves = WaveSystem::new(WaveConfig::new(config.seed));
        let economy = EconomyState {
            gold_multiplier: loadout.gold_multiplier,
            essence_gain: loadout.essence_gain,
            ..EconomyState::default()
        };
        let state = GameState::new(
            loadout.max_health,
            loadout.tower,
            economy,
            waves.progress().clone(),
        );

        Self {
            keep: Keep {
                tower: Tower::new(loadout.tower),
                state,
            },
            meta,
            projectiles: Vec::new(),
            waves,
            combat: CombatSystem::new(),
            upgrades: UpgradeSystem::new(loadout.tower),
            effects: TemporaryEffects::new(),
            bus: EventBus::new(),
            last_essence: None,
            duplicate_projectiles: 0,
        }
    }

    /// Advances the match by `elapsed` wall time, scaled by the speed multiplier.
    pub fn update(&mut self, elapsed: Duration) {
        let state = &self.keep.state;
        if state.is_paused || state.is_game_over {
            return;
        }
        let dt = elapsed.as_secs_f32() * state.speed_multiplier;

        self.keep.state.survival_time += dt;
        self.effects.update(dt, &mut self.keep);
        self.advance_ability(dt);
        self.advance_kill_streak(dt);
        self.accrue_interest(dt);
        self.regenerate(dt);

        let mut events = Vec::new();
        self.waves.update(dt, &mut events);
        self.publish(events);

        let mut events = Vec::new();
        self.combat
            .update(dt, &self.keep.tower, self.waves.live_enemies(), &mut events);
        self.publish(events);

        self.advance_projectiles(dt);
        self.resolve_projectile_hits();
        self.resolve_tower_contacts();
        self.sweep_projectiles();

        self.keep.state.wave = self.waves.current_wave();
    }

    /// Suspends updates.
    pub fn pause(&mut self) {
        self.keep.state.is_paused = true;
    }

    /// Resumes updates.
    pub fn resume(&mut self) {
        self.keep.state.is_paused = false;
    }

    /// Switches the time scale between normal and double speed.
    pub fn toggle_speed(&mut self) {
        let state = &mut self.keep.state;
        state.speed_multiplier = if state.speed_multiplier > 1.0 { 1.0 } else { 2.0 };
    }

    /// Deep snapshot of the match, safe to hold across frames.
    #[must_use]
    pub fn state(&self) -> GameState {
        let mut snapshot = self.keep.state.clone();
        snapshot.tower_stats = *self.keep.tower.stats();
        snapshot.upgrades = *self.upgrades.levels();
        snapshot.mini_upgrades = *self.upgrades.mini_levels();
        snapshot.enemy_count = self.waves.live_count();
        snapshot.wave_progress = self.waves.progress().clone();
        snapshot
    }

    /// Reports whether the defender fell.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.keep.state.is_game_over
    }

    /// Gold price of the next level of `kind`, or `None` once maxed.
    #[must_use]
    pub fn upgrade_cost(&self, kind: UpgradeKind) -> Option<u64> {
        self.upgrades.cost(kind)
    }

    /// Reports whether the next level of `kind` can be bought right now.
    #[must_use]
    pub fn can_afford_upgrade(&self, kind: UpgradeKind) -> bool {
        !self.keep.state.is_game_over && self.upgrades.can_afford(kind, self.keep.state.gold)
    }

    /// Buys one level of `kind` with gold.
    ///
    /// # Errors
    ///
    /// Refuses the purchase without changing any state when the match is
    /// over, the upgrade is maxed, or gold is short.
    pub fn purchase_upgrade(
        &mut self,
        kind: UpgradeKind,
    ) -> Result<Purchase<UpgradeKind>, PurchaseError> {
        if self.keep.state.is_game_over {
            return Err(PurchaseError::MatchOver);
        }
        let purchase = self.upgrades.purchase(kind, &mut self.keep.state.gold)?;
        self.apply_purchase(purchase.max_health_bonus);
        self.publish(vec![Event::UpgradePurchased {
            upgrade: Purchasable::Upgrade(kind),
            cost: purchase.cost,
            new_level: purchase.new_level,
        }]);
        Ok(purchase)
    }

    /// Gold price of the next level of a mini upgrade.
    #[must_use]
    pub fn mini_upgrade_cost(&self, kind: MiniUpgradeKind) -> Option<u64> {
        self.upgrades.mini_cost(kind)
    }

    /// Reports whether the next level of a mini upgrade can be bought right now.
    #[must_use]
    pub fn can_afford_mini_upgrade(&self, kind: MiniUpgradeKind) -> bool {
        !self.keep.state.is_game_over && self.upgrades.can_afford_mini(kind, self.keep.state.gold)
    }

    /// Buys one level of a mini upgrade with gold.
    ///
    /// # Errors
    ///
    /// Refuses the purchase without changing any state when the match is
    /// over or gold is short.
    pub fn purchase_mini_upgrade(
        &mut self,
        kind: MiniUpgradeKind,
    ) -> Result<Purchase<MiniUpgradeKind>, PurchaseError> {
        if self.keep.state.is_game_over {
            return Err(PurchaseError::MatchOver);
        }
        let purchase = self.upgrades.purchase_mini(kind, &mut self.keep.state.gold)?;
        self.apply_purchase(purchase.max_health_bonus);
        self.publish(vec![Event::UpgradePurchased {
            upgrade: Purchasable::Mini(kind),
            cost: purchase.cost,
            new_level: purchase.new_level,
        }]);
        Ok(purchase)
    }

    /// Essence price of the next permanent level of `kind`.
    #[must_use]
    pub fn permanent_upgrade_cost(&self, kind: PermanentUpgradeKind) -> Option<u64> {
        permanent::cost(kind, &self.meta.upgrades)
    }

    /// Buys one permanent level with essence from this match's meta record.
    ///
    /// The level takes effect in matches constructed from [`Game::meta`].
    ///
    /// # Errors
    ///
    /// Refuses the purchase without changing the record when the upgrade is
    /// maxed or essence is short.
    pub fn purchase_permanent_upgrade(
        &mut self,
        kind: PermanentUpgradeKind,
    ) -> Result<Purchase<PermanentUpgradeKind>, PurchaseError> {
        let purchase = permanent::purchase(kind, &mut self.meta)?;
        self.publish(vec![Event::UpgradePurchased {
            upgrade: Purchasable::Permanent(kind),
            cost: purchase.cost,
            new_level: purchase.new_level,
        }]);
        Ok(purchase)
    }

    /// Activates the speed boost, reporting whether it started.
    pub fn activate_ability(&mut self) -> bool {
        let state = &self.keep.state;
        if state.is_game_over
            || state.ability.speed_boost_active
            || state.ability.speed_boost_cooldown > 0.0
        {
            return false;
        }

        let original = self.keep.tower.stats().fire_rate;
        let boosted = original * tuning::SPEED_BOOST_MULTIPLIER;
        let started = self.effects.start_effect(
            EffectKey::SpeedBoost,
            original,
            boosted,
            tuning::SPEED_BOOST_DURATION,
            Box::new(|keep: &mut Keep, original| {
                keep.tower.stats_mut().fire_rate = original;
                keep.state.ability.speed_boost_active = false;
                keep.state.ability.speed_boost_remaining = 0.0;
            }),
        );
        if let Err(error) = started {
            warn!(%error, "speed boost refused");
            return false;
        }

        self.keep.tower.stats_mut().fire_rate = boosted;
        let ability = &mut self.keep.state.ability;
        ability.speed_boost_active = true;
        ability.speed_boost_remaining = tuning::SPEED_BOOST_DURATION;
        ability.speed_boost_cooldown = tuning::SPEED_BOOST_COOLDOWN;
        true
    }

    /// Damages the defender directly. Development and test hook.
    pub fn debug_damage(&mut self, amount: f32) {
        if self.keep.state.is_game_over {
            return;
        }
        self.publish(vec![Event::TowerDamaged {
            damage: amount,
            source: None,
        }]);
    }

    /// Credits gold directly. Development and test hook.
    pub fn debug_add_gold(&mut self, amount: u64) {
        self.keep.state.gold += amount;
    }

    /// Tears the match down: unsubscribes every listener, restores stats
    /// overridden by temporary effects, and drains every pool.
    pub fn destroy(&mut self) {
        self.bus.remove_all_listeners(None);
        self.effects.clear(&mut self.keep);
        self.waves.reset();
        let _ = self.combat.reset();
        self.projectiles.clear();
    }

    /// Live enemies in spawn order.
    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.waves.live_enemies()
    }

    /// The defender.
    #[must_use]
    pub fn tower(&self) -> &Tower {
        &self.keep.tower
    }

    /// Live projectiles in launch order.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles
            .iter()
            .filter_map(|id| self.combat.projectile(*id))
    }

    /// Event bus for external subscribers.
    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Meta-progression record, including essence earned and spent this match.
    #[must_use]
    pub fn meta(&self) -> &MetaProgress {
        &self.meta
    }

    /// Essence awarded at game over, once the match has ended.
    #[must_use]
    pub fn last_essence(&self) -> Option<u64> {
        self.last_essence
    }

    /// Duplicate live projectiles removed by the cleanup sweep so far.
    #[must_use]
    pub fn duplicate_projectiles_detected(&self) -> u64 {
        self.duplicate_projectiles
    }

    fn publish(&mut self, events: Vec<Event>) {
        for event in events {
            let mut caused = Vec::new();
            self.react(&event, &mut caused);
            self.bus.emit(&event);
            if !caused.is_empty() {
                self.publish(caused);
            }
        }
    }

    fn react(&mut self, event: &Event, caused: &mut Vec<Event>) {
        match event {
            Event::EnemyKilled(killed) => {
                self.waves.handle_enemy_killed(killed, caused);
                self.credit_kill(killed);
            }
            Event::TowerDamaged { damage, .. } => self.damage_tower(*damage, caused),
            Event::WaveCompleted { bonus_gold, .. } => self.credit_wave(*bonus_gold),
            Event::ProjectileSpawned { projectile, .. } => self.projectiles.push(*projectile),
            Event::EnemySpawned { .. }
            | Event::EnemyDamaged { .. }
            | Event::TowerShoot { .. }
            | Event::WaveStarted { .. }
            | Event::GameOver { .. }
            | Event::UpgradePurchased { .. } => {}
        }
    }

    fn credit_kill(&mut self, killed: &EnemyKilled) {
        let state = &mut self.keep.state;
        if state.is_game_over {
            return;
        }
        state.gold += (killed.reward as f64 * state.economy.gold_multiplier).floor() as u64;
        state.score += killed.reward;

        let streak = &mut state.kill_streak;
        streak.count += 1;
        streak.timer = tuning::KILL_STREAK_WINDOW;
        if streak.count >= tuning::KILL_STREAK_THRESHOLD && !streak.active {
            self.start_kill_streak();
        }
    }

    fn start_kill_streak(&mut self) {
        let original = self.keep.tower.stats().damage;
        let boosted = original * tuning::KILL_STREAK_DAMAGE_MULTIPLIER;
        let started = self.effects.start_effect(
            EffectKey::KillStreak,
            original,
            boosted,
            tuning::KILL_STREAK_DURATION,
            Box::new(|keep: &mut Keep, original| {
                keep.tower.stats_mut().damage = original;
                keep.state.kill_streak.active = false;
                keep.state.kill_streak.count = 0;
            }),
        );
        if let Err(error) = started {
            warn!(%error, "kill streak bonus refused");
            return;
        }
        self.keep.tower.stats_mut().damage = boosted;
        self.keep.state.kill_streak.active = true;
    }

    fn damage_tower(&mut self, damage: f32, caused: &mut Vec<Event>) {
        let state = &mut self.keep.state;
        if state.is_game_over {
            return;
        }
        state.health -= damage;
        if state.health <= 0.0 {
            self.game_over(caused);
        }
    }

    fn game_over(&mut self, caused: &mut Vec<Event>) {
        let state = &mut self.keep.state;
        if state.is_game_over {
            return;
        }
        state.is_game_over = true;
        state.health = 0.0;
        let score = state.score;
        let essence = (score as f64 * tuning::ESSENCE_CONVERSION_RATE * state.economy.essence_gain)
            .floor() as u64;

        self.waves.halt();
        let _ = self.combat.reset();
        self.projectiles.clear();
        self.meta.essence += essence;
        self.last_essence = Some(essence);

        info!(
            score,
            essence,
            wave = self.waves.current_wave(),
            "game over"
        );
        caused.push(Event::GameOver { score, essence });
    }

    fn credit_wave(&mut self, bonus_gold: u64) {
        let state = &mut self.keep.state;
        if state.is_game_over {
            return;
        }
        // Exact comparison: any health lost during the wave breaks the streak.
        let mut credit = if state.health == state.wave_start_health {
            state.perfect_wave_streak += 1;
            (bonus_gold as f64 * tuning::PERFECT_WAVE_MULTIPLIER).floor() as u64
        } else {
            state.perfect_wave_streak = 0;
            bonus_gold
        };
        credit += state.economy.gold_per_round;
        state.gold += credit;
        state.wave_start_health = state.health;
    }

    fn apply_purchase(&mut self, max_health_bonus: f32) {
        let state = &mut self.keep.state;
        state.max_health += max_health_bonus;
        state.health += max_health_bonus;
        state.economy.gold_per_round = self.upgrades.gold_per_round();
        state.economy.interest_rate = self.upgrades.interest_rate();
        state.economy.health_regen = self.upgrades.health_regen_rate();
        self.apply_tower_stats();
    }

    fn apply_tower_stats(&mut self) {
        let mut stats = self.upgrades.current_tower_stats();
        if self.effects.has_effect(EffectKey::SpeedBoost) {
            let boosted = stats.fire_rate * tuning::SPEED_BOOST_MULTIPLIER;
            let _ = self
                .effects
                .rebase(EffectKey::SpeedBoost, stats.fire_rate, boosted);
            stats.fire_rate = boosted;
        }
        if self.effects.has_effect(EffectKey::KillStreak) {
            let boosted = stats.damage * tuning::KILL_STREAK_DAMAGE_MULTIPLIER;
            let _ = self
                .effects
                .rebase(EffectKey::KillStreak, stats.damage, boosted);
            stats.damage = boosted;
        }
        self.keep.tower.set_stats(stats);
    }

    fn advance_ability(&mut self, dt: f32) {
        let ability = &mut self.keep.state.ability;
        ability.speed_boost_cooldown = (ability.speed_boost_cooldown - dt).max(0.0);
        ability.speed_boost_remaining = self
            .effects
            .remaining(EffectKey::SpeedBoost)
            .map_or(0.0, |remaining| remaining.max(0.0));
    }

    fn advance_kill_streak(&mut self, dt: f32) {
        let streak = &mut self.keep.state.kill_streak;
        if streak.timer <= 0.0 {
            return;
        }
        streak.timer -= dt;
        if streak.timer <= 0.0 {
            streak.timer = 0.0;
            streak.count = 0;
        }
    }

    fn accrue_interest(&mut self, dt: f32) {
        let state = &mut self.keep.state;
        if state.economy.interest_rate <= 0.0 {
            return;
        }
        state.economy.interest_timer += dt;
        while state.economy.interest_timer >= 1.0 {
            state.gold += (state.gold as f64 * state.economy.interest_rate).floor() as u64;
            state.economy.interest_timer -= 1.0;
        }
    }

    fn regenerate(&mut self, dt: f32) {
        let state = &mut self.keep.state;
        let rate = state.economy.health_regen;
        if rate > 0.0 && state.health < state.max_health {
            state.health = (state.health + rate * dt).min(state.max_health);
        }
    }

    fn advance_projectiles(&mut self, dt: f32) {
        let mut seen = HashSet::with_capacity(self.projectiles.len());
        for &id in &self.projectiles {
            if !seen.insert(id) {
                continue;
            }
            if let Some(projectile) = self.combat.projectile_mut(id) {
                if !projectile.is_destroyed() {
                    projectile.update(dt);
                }
            }
        }
    }

    fn resolve_projectile_hits(&mut self) {
        let targets = self.waves.live_ids().to_vec();
        let shots = self.projectiles.clone();
        let now = self.keep.state.survival_time;

        for shot in shots {
            if self.keep.state.is_game_over {
                return;
            }
            let Some(projectile) = self.combat.projectile(shot) else {
                continue;
            };
            let hit = targets.iter().copied().find(|&target| {
                self.waves
                    .enemy(target)
                    .is_some_and(|enemy| projectile.check_collision(enemy))
            });
            let Some(target) = hit else {
                continue;
            };
            let damage = projectile.damage();

            let mut events = Vec::new();
            self.strike(target, damage, now, &mut events);
            let chain = match (self.waves.enemy(target), self.combat.projectile_mut(shot)) {
                (Some(enemy), Some(projectile)) => {
                    projectile.on_hit(enemy, self.waves.live_enemies())
                }
                _ => None,
            };
            if let Some(spec) = chain {
                let _ = self.combat.spawn_chain(spec, &mut events);
            }
            self.publish(events);
        }
    }

    fn strike(&mut self, target: EntityId, amount: f32, now: f32, out: &mut Vec<Event>) {
        let Some(enemy) = self.waves.enemy_mut(target) else {
            return;
        };
        let before = enemy.health();
        let killed = enemy.take_damage(amount, now);
        out.push(Event::EnemyDamaged {
            enemy: target,
            kind: enemy.kind(),
            damage: before - enemy.health(),
            remaining_health: enemy.health(),
        });
        if let Some(killed) = killed {
            out.push(Event::EnemyKilled(killed));
        }
    }

    fn resolve_tower_contacts(&mut self) {
        let now = self.keep.state.survival_time;
        for target in self.waves.live_ids().to_vec() {
            if self.keep.state.is_game_over {
                return;
            }
            let Some(enemy) = self.waves.enemy(target) else {
                continue;
            };
            if !enemy.is_targetable()
                || !self.keep.tower.is_touching(enemy.position(), enemy.radius())
            {
                continue;
            }
            let damage = enemy.damage();
            let source = Some(enemy.kind());

            self.publish(vec![Event::TowerDamaged { damage, source }]);
            let killed = self.waves.enemy_mut(target).and_then(|enemy| {
                let health = enemy.health();
                enemy.take_damage(health, now)
            });
            if let Some(killed) = killed {
                self.publish(vec![Event::EnemyKilled(killed)]);
            }
        }
    }

    fn sweep_projectiles(&mut self) {
        let mut seen = HashSet::with_capacity(self.projectiles.len());
        let mut live = Vec::with_capacity(self.projectiles.len());
        let mut duplicates = 0_u64;

        for id in std::mem::take(&mut self.projectiles) {
            if !seen.insert(id) {
                duplicates += 1;
                continue;
            }
            match self.combat.projectile(id) {
                Some(projectile) if !projectile.is_destroyed() => live.push(id),
                Some(_) => {
                    let _ = self.combat.release(id);
                }
                None => {}
            }
        }

        if duplicates > 0 {
            warn!(duplicates, "removed duplicate live projectiles");
            self.duplicate_projectiles += duplicates;
        }
        self.projectiles = live;
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave state machine producing enemies from declarative compositions.
//!
//! The system alternates between an idle countdown and an active phase that
//! drains a shuffled spawn queue. It owns the enemy pool and the live-enemy
//! list; deaths are reported back through [`WaveSystem::handle_enemy_killed`]
//! so splitter replacements and remaining counts stay in step with combat.

pub mod compositions;

use std::collections::{BTreeMap, VecDeque};
use std::f32::consts::TAU;

use bastion_core::{
    rng::STREAM_WAVES, tuning, EnemyKilled, EnemyKind, EntityId, Event, MatchRng, Pool,
};
use bastion_entities::{definition, Enemy};
use glam::Vec2;
use serde::Serialize;
use tracing::debug;

pub use compositions::{composition_for, EnemyCount, WaveComposition};

/// Configuration parameters required to construct the wave system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    first_wave_delay: f32,
}

impl Config {
    /// Creates a configuration deriving the spawn stream from `match_seed`.
    #[must_use]
    pub const fn new(match_seed: u64) -> Self {
        Self {
            rng_seed: match_seed,
            first_wave_delay: tuning::FIRST_WAVE_DELAY,
        }
    }

    /// Overrides the countdown before the first wave.
    #[must_use]
    pub const fn with_first_wave_delay(mut self, seconds: f32) -> Self {
        self.first_wave_delay = seconds;
        self
    }
}

/// Read-only view of the wave state machine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveProgress {
    /// Wave currently running, or the next wave while idle.
    pub current_wave: u32,
    /// Whether the wave is spawning or still has live enemies.
    pub is_active: bool,
    /// Kills still required per kind before the wave may complete.
    pub remaining: BTreeMap<EnemyKind, u32>,
    /// Kills recorded during the current wave.
    pub enemies_killed: u32,
    /// Seconds left before the next wave starts while idle.
    pub next_wave_timer: f32,
    /// Composition of the current or most recent wave.
    pub composition: Option<WaveComposition>,
}

impl WaveProgress {
    fn new(first_wave_delay: f32) -> Self {
        Self {
            current_wave: 1,
            is_active: false,
            remaining: BTreeMap::new(),
            enemies_killed: 0,
            next_wave_timer: first_wave_delay,
            composition: None,
        }
    }

    /// Kills still required across every kind.
    #[must_use]
    pub fn total_remaining(&self) -> u32 {
        self.remaining.values().sum()
    }
}

#[derive(Clone, Copy, Debug)]
struct QueuedSpawn {
    kind: EnemyKind,
    position: Vec2,
}

/// Spawns waves of enemies and tracks their completion.
#[derive(Debug)]
pub struct WaveSystem {
    config: Config,
    enemies: Pool<Enemy>,
    live: Vec<EntityId>,
    queue: VecDeque<QueuedSpawn>,
    spawn_timer: f32,
    progress: WaveProgress,
    rng: MatchRng,
    halted: bool,
}

impl WaveSystem {
    /// Creates an idle wave system counting down to wave one.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            enemies: Pool::new(Enemy::new, tuning::ENEMY_POOL_PREFILL),
            live: Vec::new(),
            queue: VecDeque::new(),
            spawn_timer: 0.0,
            progress: WaveProgress::new(config.first_wave_delay),
            rng: MatchRng::stream(config.rng_seed, STREAM_WAVES),
            halted: false,
        }
    }

    /// Advances the state machine, spawning and moving enemies.
    pub fn update(&mut self, dt: f32, out: &mut Vec<Event>) {
        if self.halted {
            return;
        }

        if self.progress.is_active {
            self.spawn_timer += dt;
            let delay = self
                .progress
                .composition
                .as_ref()
                .map_or(0.0, |composition| composition.spawn_delay);
            if self.spawn_timer >= delay {
                if let Some(spawn) = self.queue.pop_front() {
                    self.spawn_queued(spawn, out);
                    self.spawn_timer = 0.0;
                }
            }
        } else {
            self.progress.next_wave_timer -= dt;
            if self.progress.next_wave_timer <= 0.0 {
                self.start_wave(out);
            }
        }

        self.advance_enemies(dt);

        if self.progress.is_active
            && self.queue.is_empty()
            && self.live.is_empty()
            && self.progress.total_remaining() == 0
        {
            self.complete_wave(out);
        }
    }

    /// Reacts to an enemy death: counts it and spawns splitter replacements.
    pub fn handle_enemy_killed(&mut self, killed: &EnemyKilled, out: &mut Vec<Event>) {
        if self.halted {
            return;
        }

        if self.progress.is_active {
            if let Some(remaining) = self.progress.remaining.get_mut(&killed.kind) {
                *remaining = remaining.saturating_sub(1);
            }
            self.progress.enemies_killed += 1;
        }

        let Some(split) = killed.split else {
            return;
        };
        for index in 0..split.count {
            let angle = TAU * index as f32 / split.count as f32;
            let position =
                split.position + Vec2::new(angle.cos(), angle.sin()) * tuning::SPLIT_SPAWN_RADIUS;
            let _ = self.spawn_enemy(split.kind, position, out);
        }
        if self.progress.is_active {
            *self.progress.remaining.entry(split.kind).or_insert(0) += split.count;
        }
    }

    /// Stops the wave system after game over, keeping the wave number.
    pub fn halt(&mut self) {
        let _ = self.enemies.release_all();
        self.live.clear();
        self.queue.clear();
        self.progress.is_active = false;
        self.halted = true;
    }

    /// Restores the initial idle state, draining every enemy.
    pub fn reset(&mut self) {
        let _ = self.enemies.release_all();
        self.live.clear();
        self.queue.clear();
        self.spawn_timer = 0.0;
        self.progress = WaveProgress::new(self.config.first_wave_delay);
        self.rng = MatchRng::stream(self.config.rng_seed, STREAM_WAVES);
        self.halted = false;
    }

    /// Wave currently running, or the next wave while idle.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.progress.current_wave
    }

    /// Read-only view of the state machine.
    #[must_use]
    pub fn progress(&self) -> &WaveProgress {
        &self.progress
    }

    /// Reports whether a wave is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.progress.is_active
    }

    /// Reports whether the system was halted by game over.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Handles of the live enemies in spawn order.
    #[must_use]
    pub fn live_ids(&self) -> &[EntityId] {
        &self.live
    }

    /// Live enemies in spawn order.
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.live.iter().filter_map(|id| self.enemies.get(*id))
    }

    /// Number of enemies in the live list.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of spawns still queued for the current wave.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Shared access to a pooled enemy.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    /// Exclusive access to a pooled enemy.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.get_mut(id)
    }

    /// Number of enemies currently drawn from the pool.
    #[must_use]
    pub fn active_enemies(&self) -> usize {
        self.enemies.active_count()
    }

    fn start_wave(&mut self, out: &mut Vec<Event>) {
        let composition = composition_for(self.progress.current_wave);
        let mut queue = Vec::with_capacity(composition.total_enemies() as usize);
        self.progress.remaining.clear();
        for entry in &composition.enemies {
            *self.progress.remaining.entry(entry.kind).or_insert(0) += entry.count;
            for _ in 0..entry.count {
                let angle = self.rng.angle();
                queue.push(QueuedSpawn {
                    kind: entry.kind,
                    position: tuning::ARENA_CENTER
                        + Vec2::new(angle.cos(), angle.sin()) * tuning::ENEMY_SPAWN_DISTANCE,
                });
            }
        }
        self.rng.shuffle(&mut queue);

        debug!(
            wave = composition.wave,
            enemies = queue.len(),
            "wave started"
        );
        out.push(Event::WaveStarted {
            wave: composition.wave,
            enemy_count: composition.total_enemies(),
        });

        self.queue = queue.into();
        self.spawn_timer = 0.0;
        self.progress.enemies_killed = 0;
        self.progress.is_active = true;
        self.progress.composition = Some(composition);
    }

    fn complete_wave(&mut self, out: &mut Vec<Event>) {
        let wave = self.progress.current_wave;
        let bonus_gold = self
            .progress
            .composition
            .as_ref()
            .and_then(|composition| composition.bonus_gold)
            .unwrap_or(0);

        debug!(wave, bonus_gold, "wave completed");
        out.push(Event::WaveCompleted { wave, bonus_gold });

        self.progress.is_active = false;
        self.progress.current_wave += 1;
        self.progress.next_wave_timer = tuning::NEXT_WAVE_DELAY;
    }

    fn spawn_queued(&mut self, spawn: QueuedSpawn, out: &mut Vec<Event>) {
        let group = definition(spawn.kind).spawn_group;
        if group <= 1 {
            let _ = self.spawn_enemy(spawn.kind, spawn.position, out);
            return;
        }
        for index in 0..group {
            let angle = TAU * index as f32 / group as f32;
            let position =
                spawn.position + Vec2::new(angle.cos(), angle.sin()) * tuning::SPAWN_GROUP_RADIUS;
            let _ = self.spawn_enemy(spawn.kind, position, out);
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2, out: &mut Vec<Event>) -> EntityId {
        let wave = self.progress.current_wave;
        let id = self.enemies.acquire_with(|id, enemy| {
            enemy.init(id, definition(kind), position, wave);
        });
        self.live.push(id);
        out.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
        });
        id
    }

    fn advance_enemies(&mut self, dt: f32) {
        let enemies = &mut self.enemies;
        self.live.retain(|&id| {
            let alive = match enemies.get_mut(id) {
                None => return false,
                Some(enemy) if enemy.is_active() && !enemy.is_dead() => {
                    enemy.update(dt, tuning::ARENA_CENTER);
                    true
                }
                Some(_) => false,
            };
            if !alive {
                let _ = enemies.release(id);
            }
            alive
        });
    }
}

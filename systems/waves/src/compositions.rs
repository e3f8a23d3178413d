//! Declarative wave compositions.

use bastion_core::EnemyKind;
use serde::Serialize;

/// Highest wave number described by the hand-authored table.
pub const AUTHORED_WAVES: u32 = 10;

/// Number of enemies of one kind in a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyCount {
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Number of queued spawns of that kind.
    pub count: u32,
}

/// Immutable description of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveComposition {
    /// Number of the wave.
    pub wave: u32,
    /// Queued spawns by kind.
    pub enemies: Vec<EnemyCount>,
    /// Seconds between consecutive spawns.
    pub spawn_delay: f32,
    /// Bonus gold credited when the wave is cleared.
    pub bonus_gold: Option<u64>,
}

impl WaveComposition {
    /// Total number of queued spawns.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.enemies.iter().map(|entry| entry.count).sum()
    }
}

/// Builds the composition of `wave`: authored for early waves, procedural afterwards.
#[must_use]
pub fn composition_for(wave: u32) -> WaveComposition {
    if wave <= AUTHORED_WAVES {
        authored(wave)
    } else {
        procedural(wave)
    }
}

fn authored(wave: u32) -> WaveComposition {
    use EnemyKind::{Basic, Splitter, Swarm, Tank};

    match wave {
        0 | 1 => authored_wave(1, &[(Basic, 3)], 2.0, Some(10)),
        2 => authored_wave(2, &[(Basic, 6)], 1.5, Some(15)),
        3 => authored_wave(3, &[(Basic, 4), (Swarm, 3)], 1.2, Some(20)),
        4 => authored_wave(4, &[(Basic, 8), (Swarm, 8)], 0.8, None),
        5 => authored_wave(5, &[(Basic, 6), (Tank, 2)], 1.0, Some(50)),
        6 => authored_wave(6, &[(Swarm, 20)], 0.5, None),
        7 => authored_wave(7, &[(Basic, 5), (Splitter, 3), (Swarm, 4)], 0.8, None),
        8 => authored_wave(8, &[(Tank, 4), (Basic, 8)], 0.7, None),
        9 => authored_wave(
            9,
            &[(Basic, 8), (Swarm, 10), (Tank, 2), (Splitter, 2)],
            0.6,
            None,
        ),
        _ => authored_wave(10, &[(Tank, 6), (Splitter, 4)], 0.8, Some(100)),
    }
}

fn authored_wave(
    wave: u32,
    enemies: &[(EnemyKind, u32)],
    spawn_delay: f32,
    bonus_gold: Option<u64>,
) -> WaveComposition {
    WaveComposition {
        wave,
        enemies: enemies
            .iter()
            .map(|&(kind, count)| EnemyCount { kind, count })
            .collect(),
        spawn_delay,
        bonus_gold,
    }
}

fn procedural(wave: u32) -> WaveComposition {
    let beyond = (wave - AUTHORED_WAVES) as f32;
    let difficulty = 1.0 + beyond * 0.1;
    let enemies = [
        (EnemyKind::Basic, (5.0 * difficulty).floor()),
        (EnemyKind::Swarm, (4.0 * difficulty).floor()),
        (EnemyKind::Tank, (1.0 + beyond / 5.0).floor()),
        (EnemyKind::Splitter, (1.0 + beyond / 6.0).floor()),
    ]
    .into_iter()
    .map(|(kind, count)| EnemyCount {
        kind,
        count: count as u32,
    })
    .filter(|entry| entry.count > 0)
    .collect();

    WaveComposition {
        wave,
        enemies,
        spawn_delay: (0.8 - beyond * 0.02).max(0.3),
        bonus_gold: (wave % 5 == 0).then(|| 50 * u64::from(wave / 5)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(composition: &WaveComposition, kind: EnemyKind) -> u32 {
        composition
            .enemies
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.count)
            .sum()
    }

    #[test]
    fn first_wave_is_three_basics() {
        let wave = composition_for(1);

        assert_eq!(wave.total_enemies(), 3);
        assert_eq!(count(&wave, EnemyKind::Basic), 3);
        assert_eq!(wave.spawn_delay, 2.0);
        assert_eq!(wave.bonus_gold, Some(10));
    }

    #[test]
    fn authored_table_covers_ten_waves() {
        let seventh = composition_for(7);
        assert_eq!(count(&seventh, EnemyKind::Splitter), 3);
        assert_eq!(seventh.bonus_gold, None);

        let tenth = composition_for(10);
        assert_eq!(count(&tenth, EnemyKind::Tank), 6);
        assert_eq!(tenth.bonus_gold, Some(100));
    }

    #[test]
    fn procedural_waves_scale_with_distance_past_the_table() {
        let wave = composition_for(20);

        assert_eq!(count(&wave, EnemyKind::Basic), 10);
        assert_eq!(count(&wave, EnemyKind::Swarm), 8);
        assert_eq!(count(&wave, EnemyKind::Tank), 3);
        assert_eq!(count(&wave, EnemyKind::Splitter), 2);
        assert_eq!(wave.bonus_gold, Some(200));
        assert!((wave.spawn_delay - 0.6).abs() < 1e-6);
    }

    #[test]
    fn procedural_spawn_delay_bottoms_out() {
        let wave = composition_for(60);

        assert_eq!(wave.spawn_delay, 0.3);
        assert_eq!(composition_for(61).bonus_gold, None);
    }
}

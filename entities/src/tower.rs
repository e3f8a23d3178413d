//! The stationary defender.

use bastion_core::{tuning, TowerStats};
use glam::Vec2;

use crate::Targetable;

/// Stationary tower anchored at the arena centre.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    position: Vec2,
    radius: f32,
    stats: TowerStats,
}

impl Tower {
    /// Creates a tower at the arena centre with the provided statistics.
    #[must_use]
    pub fn new(stats: TowerStats) -> Self {
        Self {
            position: tuning::ARENA_CENTER,
            radius: tuning::TOWER_RADIUS,
            stats,
        }
    }

    /// Centre of the tower.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Radius of the tower's hit circle.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Current combat statistics.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.stats
    }

    /// Mutable combat statistics, for upgrade recomputation and timed effects.
    pub fn stats_mut(&mut self) -> &mut TowerStats {
        &mut self.stats
    }

    /// Replaces every statistic at once.
    pub fn set_stats(&mut self, stats: TowerStats) {
        self.stats = stats;
    }

    /// Returns the closest targetable candidate inside range.
    ///
    /// Candidates at exactly equal distance resolve to the one listed first.
    pub fn find_nearest_target<'a, T, I>(&self, candidates: I) -> Option<&'a T>
    where
        T: Targetable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut nearest: Option<(&'a T, f32)> = None;
        for candidate in candidates {
            if !candidate.is_targetable() {
                continue;
            }
            let distance = self.position.distance(candidate.position());
            if distance > self.stats.range {
                continue;
            }
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((candidate, distance)),
            }
        }
        nearest.map(|(target, _)| target)
    }

    /// Reports whether the provided circle overlaps the tower's hit circle.
    #[must_use]
    pub fn is_touching(&self, position: Vec2, radius: f32) -> bool {
        self.position.distance(position) < self.radius + radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::EntityId;

    struct Dummy {
        id: u32,
        position: Vec2,
        dead: bool,
    }

    impl Targetable for Dummy {
        fn id(&self) -> EntityId {
            EntityId::new(self.id, 0)
        }

        fn position(&self) -> Vec2 {
            self.position
        }

        fn radius(&self) -> f32 {
            10.0
        }

        fn is_active(&self) -> bool {
            true
        }

        fn is_dead(&self) -> bool {
            self.dead
        }
    }

    fn dummy(id: u32, offset: Vec2, dead: bool) -> Dummy {
        Dummy {
            id,
            position: tuning::ARENA_CENTER + offset,
            dead,
        }
    }

    #[test]
    fn picks_the_closest_live_candidate_in_range() {
        let tower = Tower::new(TowerStats::base());
        let candidates = [
            dummy(0, Vec2::new(150.0, 0.0), false),
            dummy(1, Vec2::new(0.0, 50.0), true),
            dummy(2, Vec2::new(-90.0, 0.0), false),
            dummy(3, Vec2::new(0.0, 250.0), false),
        ];

        let target = tower.find_nearest_target(&candidates).expect("target");
        assert_eq!(target.id, 2);
    }

    #[test]
    fn equidistant_candidates_resolve_to_the_first_listed() {
        let tower = Tower::new(TowerStats::base());
        let candidates = [
            dummy(5, Vec2::new(100.0, 0.0), false),
            dummy(6, Vec2::new(-100.0, 0.0), false),
        ];

        let target = tower.find_nearest_target(&candidates).expect("target");
        assert_eq!(target.id, 5);
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let tower = Tower::new(TowerStats::base());
        let candidates = [dummy(9, Vec2::new(200.0, 0.0), false)];

        assert!(tower.find_nearest_target(&candidates).is_some());
        let out_of_range = [dummy(9, Vec2::new(200.5, 0.0), false)];
        assert!(tower.find_nearest_target(&out_of_range).is_none());
    }
}

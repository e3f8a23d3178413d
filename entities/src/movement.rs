//! Movement strategies steering enemies toward the tower.

use std::fmt;

use glam::Vec2;

/// Behaviour advancing an enemy one tick toward its target.
pub trait MovementStrategy: fmt::Debug {
    /// Returns the displacement to apply to `position` for this tick.
    fn update(&mut self, dt: f32, position: Vec2, target: Vec2) -> Vec2;
}

/// Moves in a straight line at constant speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StraightMovement {
    speed: f32,
}

impl StraightMovement {
    /// Creates a straight mover with the provided speed.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl MovementStrategy for StraightMovement {
    fn update(&mut self, dt: f32, position: Vec2, target: Vec2) -> Vec2 {
        step_toward(position, target, self.speed * dt)
    }
}

/// Weaves sideways around the direct line to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZigzagMovement {
    speed: f32,
    amplitude: f32,
    frequency: f32,
    phase: f32,
}

impl ZigzagMovement {
    /// Lateral amplitude used by the stock zigzag.
    pub const DEFAULT_AMPLITUDE: f32 = 30.0;
    /// Phase advance per unit travelled used by the stock zigzag.
    pub const DEFAULT_FREQUENCY: f32 = 0.1;
    const LATERAL_DAMPING: f32 = 0.1;

    /// Creates a zigzag mover with the stock amplitude and frequency.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self::with_shape(speed, Self::DEFAULT_AMPLITUDE, Self::DEFAULT_FREQUENCY)
    }

    /// Creates a zigzag mover with a custom amplitude and frequency.
    #[must_use]
    pub const fn with_shape(speed: f32, amplitude: f32, frequency: f32) -> Self {
        Self {
            speed,
            amplitude,
            frequency,
            phase: 0.0,
        }
    }
}

impl MovementStrategy for ZigzagMovement {
    fn update(&mut self, dt: f32, position: Vec2, target: Vec2) -> Vec2 {
        let offset = target - position;
        let distance = offset.length();
        if distance <= 0.0 {
            return Vec2::ZERO;
        }

        let heading = offset / distance;
        let forward = heading * (self.speed * dt).min(distance);
        self.phase += self.frequency * self.speed * dt;
        let lateral =
            heading.perp() * self.phase.sin() * self.amplitude * dt * Self::LATERAL_DAMPING;
        forward + lateral
    }
}

/// Walks at a normal pace and periodically bursts forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashMovement {
    normal_speed: f32,
    dash_speed: f32,
    dash_duration: f32,
    dash_interval: f32,
    until_dash: f32,
    dash_remaining: f32,
}

impl DashMovement {
    /// Seconds a single dash lasts.
    pub const DEFAULT_DASH_DURATION: f32 = 0.167;
    /// Seconds between the starts of consecutive dashes.
    pub const DEFAULT_DASH_INTERVAL: f32 = 2.0;

    /// Creates a dasher with the stock dash cadence.
    #[must_use]
    pub const fn new(normal_speed: f32, dash_speed: f32) -> Self {
        Self {
            normal_speed,
            dash_speed,
            dash_duration: Self::DEFAULT_DASH_DURATION,
            dash_interval: Self::DEFAULT_DASH_INTERVAL,
            until_dash: Self::DEFAULT_DASH_INTERVAL,
            dash_remaining: 0.0,
        }
    }

    /// Reports whether the mover is currently dashing.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        self.dash_remaining > 0.0
    }
}

impl MovementStrategy for DashMovement {
    fn update(&mut self, dt: f32, position: Vec2, target: Vec2) -> Vec2 {
        let speed = if self.is_dashing() {
            self.dash_remaining -= dt;
            self.dash_speed
        } else {
            self.until_dash -= dt;
            if self.until_dash <= 0.0 {
                self.until_dash = self.dash_interval;
                self.dash_remaining = self.dash_duration;
            }
            self.normal_speed
        };
        step_toward(position, target, speed * dt)
    }
}

/// Displacement of at most `step` toward `target`, never overshooting it.
fn step_toward(position: Vec2, target: Vec2, step: f32) -> Vec2 {
    let offset = target - position;
    let distance = offset.length();
    if distance <= step {
        return offset;
    }
    offset / distance * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_moves_speed_times_dt_toward_target() {
        let mut movement = StraightMovement::new(80.0);
        let step = movement.update(0.5, Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));

        assert_eq!(step, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn straight_never_overshoots() {
        let mut movement = StraightMovement::new(80.0);
        let step = movement.update(1.0, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));

        assert_eq!(step, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn zigzag_drifts_sideways_while_closing_in() {
        let mut movement = ZigzagMovement::new(80.0);
        let mut position = Vec2::new(0.0, 0.0);
        let target = Vec2::new(500.0, 0.0);
        let mut max_lateral: f32 = 0.0;

        for _ in 0..60 {
            position += movement.update(1.0 / 60.0, position, target);
            max_lateral = max_lateral.max(position.y.abs());
        }

        assert!(position.x > 70.0 && position.x < 90.0);
        assert!(max_lateral > 0.0);
    }

    #[test]
    fn dash_bursts_after_its_interval() {
        let mut movement = DashMovement::new(50.0, 300.0);
        let origin = Vec2::ZERO;
        let target = Vec2::new(1000.0, 0.0);

        let walk = movement.update(1.0, origin, target);
        assert!((walk.x - 50.0).abs() < 1e-4);
        assert!(!movement.is_dashing());

        let trigger = movement.update(1.0, origin, target);
        assert!((trigger.x - 50.0).abs() < 1e-4);
        assert!(movement.is_dashing());

        let dash = movement.update(0.1, origin, target);
        assert!((dash.x - 30.0).abs() < 1e-4);
    }
}

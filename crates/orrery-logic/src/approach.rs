//! Automatic approach to a named body.
//!
//! The camera is placed on the line from the sun to the body, a fixed
//! distance short of it, and eased there over a fixed duration.

use crate::vector::Vec3;

/// Stand-off distance for bodies on an orbit.
pub const ORBITING_APPROACH_DISTANCE: f64 = 50.0;

/// Stand-off distance for bodies without an orbit.
pub const FIXED_APPROACH_DISTANCE: f64 = 100.0;

/// Duration of the approach flight (seconds).
pub const APPROACH_DURATION: f64 = 2.0;

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Point from which to look at a body at `body_position`.
///
/// A body sitting at the origin has no approach direction; the camera is
/// then placed on `+Z`.
pub fn approach_point(body_position: Vec3, orbit_radius: f64) -> Vec3 {
    let distance = if orbit_radius > 0.0 {
        ORBITING_APPROACH_DISTANCE
    } else {
        FIXED_APPROACH_DISTANCE
    };
    match body_position.try_normalize() {
        Some(direction) => body_position - direction * distance,
        None => Vec3::new(0.0, 0.0, distance),
    }
}

/// Eased interpolation of the camera base position.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTween {
    pub from: Vec3,
    pub to: Vec3,
    pub duration: f64,
    pub elapsed: f64,
}

impl CameraTween {
    pub fn new(from: Vec3, to: Vec3, duration: f64) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance and return the new position.
    pub fn step(&mut self, dt: f64) -> Vec3 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.position()
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn position(&self) -> Vec3 {
        self.from.lerp(&self.to, ease_in_out_cubic(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_in_out_cubic(0.25) < 0.25);
        assert!(ease_in_out_cubic(0.75) > 0.75);
    }

    #[test]
    fn approach_stops_short_of_orbiting_body() {
        let p = approach_point(Vec3::new(200.0, 0.0, 0.0), 200.0);
        assert!(p.distance(&Vec3::new(150.0, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn approach_uses_wider_standoff_without_orbit() {
        let p = approach_point(Vec3::new(0.0, 0.0, 300.0), 0.0);
        assert!(p.distance(&Vec3::new(0.0, 0.0, 200.0)) < 1e-9);
    }

    #[test]
    fn approach_at_origin_is_finite() {
        let p = approach_point(Vec3::ZERO, 0.0);
        assert_eq!(p, Vec3::new(0.0, 0.0, 100.0));
    }

    #[test]
    fn tween_reaches_target_and_stays() {
        let from = Vec3::new(0.0, 50.0, 100.0);
        let to = Vec3::new(150.0, 0.0, 0.0);
        let mut tween = CameraTween::new(from, to, APPROACH_DURATION);
        let mut last = from.distance(&to);
        for _ in 0..125 {
            let remaining = tween.step(1.0 / 60.0).distance(&to);
            assert!(remaining <= last + 1e-9);
            last = remaining;
        }
        assert!(tween.is_finished());
        assert!(tween.step(1.0).distance(&to) < 1e-9);
    }

    #[test]
    fn zero_duration_tween_jumps() {
        let tween = CameraTween::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), 0.0);
        assert!(tween.is_finished());
        assert_eq!(tween.position(), Vec3::new(1.0, 2.0, 3.0));
    }
}

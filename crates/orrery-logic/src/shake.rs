//! Procedural camera shake layered on top of the camera's base pose.
//!
//! Intensity and frequency chase the preset for the current engine status;
//! the offset is a sum of sine/cosine harmonics of `frequency · time`.

use crate::config::ShakeProfile;
use crate::vector::Vec3;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraShake {
    pub intensity: f64,
    pub frequency: f64,
    pub time: f64,
}

impl CameraShake {
    /// Advance time and blend toward `target` at `blend_rate` per second.
    pub fn update(&mut self, dt: f64, target: ShakeProfile, blend_rate: f64) {
        self.time += dt;
        let t = (dt * blend_rate).clamp(0.0, 1.0);
        self.intensity += (target.intensity - self.intensity) * t;
        self.frequency += (target.frequency - self.frequency) * t;
    }

    /// Positional offset to add to the base camera position.
    pub fn offset(&self) -> Vec3 {
        let i = self.intensity;
        if i == 0.0 {
            return Vec3::ZERO;
        }
        let p = self.time * self.frequency;
        Vec3 {
            x: p.sin() * i + (p * 2.1).sin() * i * 0.3,
            y: (p * 0.7).cos() * i + (p * 3.7).cos() * i * 0.2,
            z: (p * 1.3).sin() * i * 0.5,
        }
    }

    /// Roll offset (radians) added on top of the base orientation.
    pub fn roll(&self) -> f64 {
        if self.intensity == 0.0 {
            return 0.0;
        }
        (self.time * self.frequency * 1.5).sin() * self.intensity * 0.1
    }
}

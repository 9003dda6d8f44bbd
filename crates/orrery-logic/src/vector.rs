//! Minimal 3D math: a double-precision vector and a YXZ Euler orientation.
//!
//! World axes follow the renderer convention: `+Y` is up, the camera looks
//! down `-Z` when its orientation is zero.

use serde::{Deserialize, Serialize};

/// 3D vector in world units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len > 0.0 {
            Some(*self * (1.0 / len))
        } else {
            None
        }
    }

    /// Rescale so that `length() <= max`.
    pub fn clamp_length(&self, max: f64) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            *self * (max / len)
        } else {
            *self
        }
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        *self + (*other - *self) * t
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl std::ops::MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, scalar: f64) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
    }
}

/// Camera orientation as Euler angles applied yaw (Y), then pitch (X),
/// then roll (Z).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Orientation {
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotate a camera-local vector into world space.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let (sr, cr) = self.roll.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();

        // Z
        let x1 = v.x * cr - v.y * sr;
        let y1 = v.x * sr + v.y * cr;
        let z1 = v.z;
        // X
        let y2 = y1 * cp - z1 * sp;
        let z2 = y1 * sp + z1 * cp;
        // Y
        Vec3 {
            x: x1 * cy + z2 * sy,
            y: y2,
            z: -x1 * sy + z2 * cy,
        }
    }

    /// World-space direction the camera is looking at.
    pub fn forward(&self) -> Vec3 {
        self.rotate(Vec3::new(0.0, 0.0, -1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(&b) < 1e-9
    }

    #[test]
    fn zero_vector_does_not_normalize() {
        assert!(Vec3::ZERO.try_normalize().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).try_normalize().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_length_only_shrinks() {
        let v = Vec3::new(30.0, 0.0, 40.0);
        assert!((v.clamp_length(10.0).length() - 10.0).abs() < 1e-12);
        assert_eq!(v.clamp_length(100.0), v);
    }

    #[test]
    fn identity_orientation_looks_down_negative_z() {
        assert!(approx(Orientation::default().forward(), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn positive_yaw_turns_left() {
        let o = Orientation::new(0.0, FRAC_PI_2, 0.0);
        assert!(approx(o.forward(), Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn positive_pitch_looks_up() {
        let o = Orientation::new(FRAC_PI_2, 0.0, 0.0);
        assert!(approx(o.forward(), Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn rotation_preserves_length() {
        let o = Orientation::new(0.3, -1.2, 0.05);
        let v = Vec3::new(1.0, 2.0, -3.0);
        assert!((o.rotate(v).length() - v.length()).abs() < 1e-12);
    }
}

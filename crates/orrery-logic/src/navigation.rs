//! First-person "spaceship" navigation.
//!
//! # Per-frame update
//!
//! 1. Build a direction from the six movement intents; normalise only when
//!    non-zero.
//! 2. Rotate it by the camera's current yaw/pitch so "forward" is
//!    camera-forward.
//! 3. `velocity += direction · speed · boost? · dt`, clamped to `max_speed`.
//! 4. `velocity *= decay` (the only damping).
//! 5. `base_position += velocity`.
//! 6. Yaw/pitch targets take the pointer/touch deltas, pitch clamped to
//!    ±π/2; the orientation is lerped toward them.
//! 7. Shake blends toward the preset for the engine status; its offset is
//!    added to the base position to form the rendered pose.
//!
//! The base position is never written back from the shaken pose.

use std::f64::consts::FRAC_PI_2;

use crate::config::{ControlsConfig, ShakeConfig, ShakeProfile, SmoothingMode};
use crate::input::ControlState;
use crate::shake::CameraShake;
use crate::vector::{Orientation, Vec3};

/// Engine status derived from the current intents. Purely observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Idle,
    Normal,
    Boost,
}

impl EngineStatus {
    pub fn from_controls(controls: &ControlState) -> Self {
        match (controls.any_movement(), controls.boost) {
            (false, _) => Self::Idle,
            (true, false) => Self::Normal,
            (true, true) => Self::Boost,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Normal => "NORMAL",
            Self::Boost => "BOOST",
        }
    }

    pub fn shake_profile(self, shake: &ShakeConfig) -> ShakeProfile {
        match self {
            Self::Idle => shake.idle,
            Self::Normal => shake.normal,
            Self::Boost => shake.boost,
        }
    }
}

/// Pose handed to the renderer: shaken position and orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Orientation,
}

/// Unit direction in camera space from the movement intents, or zero.
pub fn intent_direction(controls: &ControlState) -> Vec3 {
    let mut direction = Vec3::ZERO;
    if controls.move_forward {
        direction.z -= 1.0;
    }
    if controls.move_backward {
        direction.z += 1.0;
    }
    if controls.strafe_left {
        direction.x -= 1.0;
    }
    if controls.strafe_right {
        direction.x += 1.0;
    }
    if controls.ascend {
        direction.y += 1.0;
    }
    if controls.descend {
        direction.y -= 1.0;
    }
    direction.try_normalize().unwrap_or(Vec3::ZERO)
}

pub struct NavigationController {
    config: ControlsConfig,
    base_position: Vec3,
    velocity: Vec3,
    /// Smoothed yaw/pitch; roll stays zero here and comes from the shake.
    orientation: Orientation,
    target_yaw: f64,
    target_pitch: f64,
    shake: CameraShake,
    status: EngineStatus,
    pose: CameraPose,
}

impl NavigationController {
    pub fn new(config: ControlsConfig, start: Vec3) -> Self {
        Self {
            config,
            base_position: start,
            velocity: Vec3::ZERO,
            orientation: Orientation::default(),
            target_yaw: 0.0,
            target_pitch: 0.0,
            shake: CameraShake::default(),
            status: EngineStatus::Idle,
            pose: CameraPose {
                position: start,
                orientation: Orientation::default(),
            },
        }
    }

    /// Advance one frame. Consumes the pointer/touch deltas in `controls`;
    /// boolean intents are left untouched.
    pub fn update(&mut self, dt: f64, controls: &mut ControlState) {
        self.status = EngineStatus::from_controls(controls);
        self.integrate_movement(dt, controls);
        self.integrate_orientation(dt, controls);

        let profile = self.status.shake_profile(&self.config.shake);
        self.shake.update(dt, profile, self.config.shake.blend_rate);

        self.pose = CameraPose {
            position: self.base_position + self.shake.offset(),
            orientation: Orientation {
                roll: self.orientation.roll + self.shake.roll(),
                ..self.orientation
            },
        };
    }

    fn integrate_movement(&mut self, dt: f64, controls: &ControlState) {
        let movement = &self.config.movement;
        let local = intent_direction(controls);
        if local != Vec3::ZERO {
            let heading = Orientation {
                roll: 0.0,
                ..self.orientation
            };
            let direction = heading.rotate(local);
            let speed = if controls.boost {
                movement.speed * movement.boost_multiplier
            } else {
                movement.speed
            };
            self.velocity += direction * (speed * dt);
            self.velocity = self.velocity.clamp_length(movement.max_speed);
        }
        self.velocity *= movement.decay;
        self.base_position += self.velocity;
    }

    fn integrate_orientation(&mut self, dt: f64, controls: &mut ControlState) {
        let rotation = &self.config.rotation;
        let (pointer, touch) = controls.take_deltas();

        self.target_yaw -= pointer.0 * rotation.sensitivity + touch.0 * rotation.touch_sensitivity;
        self.target_pitch -=
            pointer.1 * rotation.sensitivity + touch.1 * rotation.touch_sensitivity;
        self.target_pitch = self.target_pitch.clamp(-FRAC_PI_2, FRAC_PI_2);

        let t = match rotation.mode {
            SmoothingMode::FixedBlend => rotation.smoothing,
            SmoothingMode::Exponential { reference_fps } => {
                1.0 - (1.0 - rotation.smoothing).powf(dt * reference_fps)
            }
        };
        self.orientation.yaw += (self.target_yaw - self.orientation.yaw) * t;
        self.orientation.pitch += (self.target_pitch - self.orientation.pitch) * t;
        self.orientation.pitch = self.orientation.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Teleport the camera, dropping any momentum.
    pub fn set_position(&mut self, position: Vec3) {
        self.base_position = position;
        self.velocity = Vec3::ZERO;
        self.pose.position = position + self.shake.offset();
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Camera position without shake.
    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current speed in units per frame.
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn target_angles(&self) -> (f64, f64) {
        (self.target_yaw, self.target_pitch)
    }

    pub fn shake(&self) -> &CameraShake {
        &self.shake
    }

    pub fn look_direction(&self) -> Vec3 {
        self.orientation.forward()
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }
}

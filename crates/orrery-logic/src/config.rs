//! Static scene and control configuration.
//!
//! Pure data: the sun, the six portfolio planets, control tunables and
//! environment settings. `OrreryConfig::default()` is the shipped portfolio;
//! alternate configs can be loaded from JSON by hosts that want them.
//!
//! ```
//! use orrery_logic::config::{validate_config, OrreryConfig};
//!
//! let config = OrreryConfig::default();
//! assert_eq!(config.bodies.len(), 6);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::vector::Vec3;

/// Title and body shown in the modal for a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    pub title: String,
    pub body: String,
}

impl ContentPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Surface style hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Rocky,
    Cloudy,
    Earthlike,
    GasGiant,
}

/// Planetary ring dimensions (renderer only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingConfig {
    pub color: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// One orbiting body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    /// Portfolio section this planet represents.
    pub section: String,
    /// Start position; the initial orbital angle is derived from it.
    pub position: [f64; 3],
    pub orbit_radius: f64,
    /// Visual radius.
    pub radius: f64,
    pub color: u32,
    pub emissive: u32,
    /// Orbital angular speed (radians per second).
    pub orbital_speed: f64,
    /// Self-rotation speed (radians per second). Negative spins retrograde.
    pub spin_speed: f64,
    pub surface: SurfaceKind,
    pub atmosphere: Option<u32>,
    pub rings: Option<RingConfig>,
    pub content: Option<ContentPayload>,
}

impl BodyConfig {
    pub fn start_position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunConfig {
    pub name: String,
    pub radius: f64,
    pub color: u32,
    pub emissive: u32,
    pub intensity: f64,
    pub spin_speed: f64,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            name: "Sun".to_string(),
            radius: 50.0,
            color: 0xffaa00,
            emissive: 0xff6600,
            intensity: 1.5,
            spin_speed: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    /// Acceleration applied per second of held input.
    pub speed: f64,
    /// Multiplier applied to `speed` while boosting.
    pub boost_multiplier: f64,
    /// Per-frame velocity decay factor, in (0, 1].
    pub decay: f64,
    pub max_speed: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            boost_multiplier: 1.5,
            decay: 0.95,
            max_speed: 10.0,
        }
    }
}

/// How the camera orientation chases its yaw/pitch targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SmoothingMode {
    /// `lerp(current, target, smoothing)` once per frame. Perceived turn
    /// rate depends on frame rate.
    FixedBlend,
    /// Same response as `FixedBlend` at `reference_fps`, scaled by `dt`.
    Exponential { reference_fps: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    pub sensitivity: f64,
    pub touch_sensitivity: f64,
    pub smoothing: f64,
    pub mode: SmoothingMode,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            touch_sensitivity: 0.003,
            smoothing: 0.1,
            mode: SmoothingMode::FixedBlend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Maximum distance at which a body becomes the interactive target.
    pub activation_radius: f64,
    /// Left clicks swallowed after a modal closes while pointer lock
    /// re-engages. Empirical; tune per browser/platform.
    pub cooldown_clicks: u32,
    /// Modal fade-out before it is actually hidden (seconds).
    pub close_animation_secs: f64,
    /// Delay between hiding the modal and re-requesting pointer lock.
    pub relock_delay_secs: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            activation_radius: 100.0,
            cooldown_clicks: 2,
            close_animation_secs: 0.3,
            relock_delay_secs: 0.1,
        }
    }
}

/// Target amplitude and frequency of the camera shake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeProfile {
    pub intensity: f64,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeConfig {
    pub idle: ShakeProfile,
    pub normal: ShakeProfile,
    pub boost: ShakeProfile,
    /// Fraction of the remaining gap closed per second.
    pub blend_rate: f64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            idle: ShakeProfile {
                intensity: 0.002,
                frequency: 2.0,
            },
            normal: ShakeProfile {
                intensity: 0.008,
                frequency: 5.0,
            },
            boost: ShakeProfile {
                intensity: 0.025,
                frequency: 12.0,
            },
            blend_rate: 3.0,
        }
    }
}

/// Engine hum: gain envelope and how tone and filter follow speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrusterConfig {
    /// Gain while thrusting.
    pub volume: f64,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
    /// Tone at rest (Hz) and its rise per unit of speed.
    pub base_tone_hz: f64,
    pub tone_per_speed: f64,
    /// Tone multiplier while boosting.
    pub boost_pitch: f64,
    pub filter_base_hz: f64,
    pub filter_per_speed: f64,
    pub filter_boost_hz: f64,
    pub filter_max_hz: f64,
    /// Time to glide tone and filter to a new target.
    pub glide_secs: f64,
}

impl Default for ThrusterConfig {
    fn default() -> Self {
        Self {
            volume: 0.08,
            fade_in_secs: 0.3,
            fade_out_secs: 0.5,
            base_tone_hz: 35.0,
            tone_per_speed: 8.0,
            boost_pitch: 1.2,
            filter_base_hz: 400.0,
            filter_per_speed: 30.0,
            filter_boost_hz: 100.0,
            filter_max_hz: 800.0,
            glide_secs: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    pub movement: MovementConfig,
    pub rotation: RotationConfig,
    pub interaction: InteractionConfig,
    pub shake: ShakeConfig,
    #[serde(default)]
    pub thruster: ThrusterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarfieldConfig {
    pub count: u32,
    pub spread: f64,
    pub size: f64,
    /// Slow rotation of the whole starfield (radians per second).
    pub spin_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogConfig {
    pub color: u32,
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub starfield: StarfieldConfig,
    pub ambient_color: u32,
    pub ambient_intensity: f64,
    pub sun_light_color: u32,
    pub sun_light_intensity: f64,
    pub fog: FogConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            starfield: StarfieldConfig {
                count: 5000,
                spread: 2000.0,
                size: 1.0,
                spin_speed: 0.0001,
            },
            ambient_color: 0x111122,
            ambient_intensity: 0.3,
            sun_light_color: 0xffffff,
            sun_light_intensity: 1.0,
            fog: FogConfig {
                color: 0x000011,
                near: 500.0,
                far: 1500.0,
            },
        }
    }
}

/// Everything the scene, controller and gate are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrreryConfig {
    pub sun: SunConfig,
    pub bodies: Vec<BodyConfig>,
    pub controls: ControlsConfig,
    pub environment: EnvironmentConfig,
    pub camera_start: [f64; 3],
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            sun: SunConfig::default(),
            bodies: portfolio_bodies(),
            controls: ControlsConfig::default(),
            environment: EnvironmentConfig::default(),
            camera_start: [0.0, 50.0, 100.0],
        }
    }
}

impl OrreryConfig {
    pub fn camera_start(&self) -> Vec3 {
        Vec3::from_array(self.camera_start)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[allow(clippy::too_many_arguments)]
fn planet(
    name: &str,
    section: &str,
    orbit_radius: f64,
    radius: f64,
    color: u32,
    emissive: u32,
    orbital_speed: f64,
    spin_speed: f64,
    surface: SurfaceKind,
    atmosphere: Option<u32>,
    content: ContentPayload,
) -> BodyConfig {
    BodyConfig {
        name: name.to_string(),
        section: section.to_string(),
        position: [orbit_radius, 0.0, 0.0],
        orbit_radius,
        radius,
        color,
        emissive,
        orbital_speed,
        spin_speed,
        surface,
        atmosphere,
        rings: None,
        content: Some(content),
    }
}

/// The six portfolio planets, innermost first.
pub fn portfolio_bodies() -> Vec<BodyConfig> {
    let mut saturn = planet(
        "Saturn",
        "Contact",
        950.0,
        22.0,
        0xffd700,
        0x332200,
        0.003,
        0.06,
        SurfaceKind::GasGiant,
        Some(0xffec8c),
        ContentPayload::new(
            "Get in Touch",
            "Contact\n\
             - Email: hello@orrery.dev\n\
             - Location: France\n\n\
             Links\n\
             - 3D portfolio: this orrery\n\
             - Source code: see the projects planet\n\n\
             Availability\n\
             Open to internships in quantitative finance, data science and \
             fintech/AI projects, and to freelance collaborations.",
        ),
    );
    saturn.rings = Some(RingConfig {
        color: 0xdddddd,
        inner_radius: 30.0,
        outer_radius: 50.0,
    });

    vec![
        planet(
            "Mercury",
            "Introduction",
            200.0,
            8.0,
            0x8c7853,
            0x2a1a0a,
            0.02,
            0.05,
            SurfaceKind::Rocky,
            None,
            ContentPayload::new(
                "Introduction",
                "Hello, and welcome aboard.\n\n\
                 A digital native with a passion for new technology, design, \
                 engineering and entrepreneurship.\n\n\
                 Mission\n\
                 Turn creative ideas into digital products by combining \
                 strategic vision with hands-on engineering.\n\n\
                 Languages\n\
                 - French: native\n\
                 - English: advanced\n\
                 - Spanish: intermediate",
            ),
        ),
        planet(
            "Venus",
            "Education",
            300.0,
            12.0,
            0xffa500,
            0x331a00,
            0.015,
            -0.02,
            SurfaceKind::Cloudy,
            Some(0xffaa00),
            ContentPayload::new(
                "Education",
                "Current\n\
                 Master in Digital Management, business school (2021 - 2026).\n\
                 Digital management and emerging technologies.\n\n\
                 Previous\n\
                 Engineering immersion semester, Marketing & Data (2022).",
            ),
        ),
        planet(
            "Earth",
            "Projects",
            400.0,
            15.0,
            0x4a90e2,
            0x001122,
            0.01,
            0.03,
            SurfaceKind::Earthlike,
            Some(0x87ceeb),
            ContentPayload::new(
                "Projects",
                "AI cost prediction\n\
                 Random-forest model predicting engineering project costs \
                 from 3,245 historical projects.\n\n\
                 Sentiment analysis\n\
                 Real-time sentiment analysis web app with an interactive \
                 dashboard.\n\n\
                 Financial instrument classifier\n\
                 Machine-learning classification of financial assets.\n\n\
                 Interactive space portfolio\n\
                 This orrery: fly a ship between planets to explore.",
            ),
        ),
        planet(
            "Mars",
            "Experience",
            550.0,
            13.0,
            0xcd5c5c,
            0x2a0a0a,
            0.008,
            0.025,
            SurfaceKind::Rocky,
            Some(0x8b4513),
            ContentPayload::new(
                "Professional Experience",
                "Operations assistant (2025)\n\
                 Logistics, route optimisation, sales follow-up and \
                 treasury reporting.\n\n\
                 Executive assistant (2023)\n\
                 Digital marketing campaigns, partnerships and competitive \
                 watch.\n\n\
                 Community manager (2022)\n\
                 Editorial planning, visual production and organic growth.",
            ),
        ),
        planet(
            "Jupiter",
            "Skills",
            750.0,
            25.0,
            0xffa500,
            0x331a00,
            0.005,
            0.08,
            SurfaceKind::GasGiant,
            Some(0xd2691e),
            ContentPayload::new(
                "Skills & Certifications",
                "Technical\n\
                 - Python and SQL\n\
                 - Machine learning: scikit-learn, pandas, NumPy\n\
                 - Web 3D: JavaScript, WebGL\n\
                 - Data visualisation and dashboards\n\n\
                 Certifications\n\
                 - Supervised Machine Learning\n\
                 - Introduction to Financial Markets\n\
                 - IELTS 6.5\n\n\
                 Soft skills\n\
                 Clear communication, analytical thinking, adaptability.",
            ),
        ),
        saturn,
    ]
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No orbiting bodies configured.
    NoBodies,
    /// Two bodies share a name.
    DuplicateBodyName(String),
    /// Body name is blank.
    EmptyBodyName,
    /// Orbit radius must be positive.
    InvalidOrbitRadius { name: String, radius: f64 },
    /// Decay factor outside (0, 1].
    InvalidDecay(f64),
    /// Max speed must be positive.
    InvalidMaxSpeed(f64),
    /// Smoothing factor outside (0, 1].
    InvalidSmoothing(f64),
    /// Activation radius must be positive.
    InvalidActivationRadius(f64),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &OrreryConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.bodies.is_empty() {
        errors.push(ConfigError::NoBodies);
    }

    let mut seen: Vec<&str> = Vec::new();
    for body in &config.bodies {
        if body.name.trim().is_empty() {
            errors.push(ConfigError::EmptyBodyName);
        } else if seen.contains(&body.name.as_str()) {
            errors.push(ConfigError::DuplicateBodyName(body.name.clone()));
        } else {
            seen.push(&body.name);
        }
        if !(body.orbit_radius > 0.0 && body.orbit_radius.is_finite()) {
            errors.push(ConfigError::InvalidOrbitRadius {
                name: body.name.clone(),
                radius: body.orbit_radius,
            });
        }
    }

    let movement = &config.controls.movement;
    if !(movement.decay > 0.0 && movement.decay <= 1.0) {
        errors.push(ConfigError::InvalidDecay(movement.decay));
    }
    if !(movement.max_speed > 0.0) {
        errors.push(ConfigError::InvalidMaxSpeed(movement.max_speed));
    }

    let smoothing = config.controls.rotation.smoothing;
    if !(smoothing > 0.0 && smoothing <= 1.0) {
        errors.push(ConfigError::InvalidSmoothing(smoothing));
    }

    let radius = config.controls.interaction.activation_radius;
    if !(radius > 0.0) {
        errors.push(ConfigError::InvalidActivationRadius(radius));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OrreryConfig::default();
        let errors = validate_config(&config);
        assert!(errors.is_empty(), "default config should be valid: {errors:?}");
    }

    #[test]
    fn default_orbit_radii() {
        let radii: Vec<f64> = OrreryConfig::default()
            .bodies
            .iter()
            .map(|b| b.orbit_radius)
            .collect();
        assert_eq!(radii, vec![200.0, 300.0, 400.0, 550.0, 750.0, 950.0]);
    }

    #[test]
    fn every_default_body_has_content() {
        for body in portfolio_bodies() {
            assert!(body.content.is_some(), "{} has no content", body.name);
        }
    }

    #[test]
    fn only_saturn_has_rings() {
        let ringed: Vec<_> = portfolio_bodies()
            .into_iter()
            .filter(|b| b.rings.is_some())
            .map(|b| b.name)
            .collect();
        assert_eq!(ringed, vec!["Saturn".to_string()]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut config = OrreryConfig::default();
        config.bodies[1].name = config.bodies[0].name.clone();
        assert!(validate_config(&config)
            .contains(&ConfigError::DuplicateBodyName("Mercury".to_string())));
    }

    #[test]
    fn empty_bodies_rejected() {
        let mut config = OrreryConfig::default();
        config.bodies.clear();
        assert!(validate_config(&config).contains(&ConfigError::NoBodies));
    }

    #[test]
    fn bad_tunables_rejected() {
        let mut config = OrreryConfig::default();
        config.controls.movement.decay = 1.5;
        config.controls.movement.max_speed = 0.0;
        config.controls.rotation.smoothing = 0.0;
        config.controls.interaction.activation_radius = -1.0;
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::InvalidDecay(1.5)));
        assert!(errors.contains(&ConfigError::InvalidMaxSpeed(0.0)));
        assert!(errors.contains(&ConfigError::InvalidSmoothing(0.0)));
        assert!(errors.contains(&ConfigError::InvalidActivationRadius(-1.0)));
    }

    #[test]
    fn nan_tunables_rejected() {
        let mut config = OrreryConfig::default();
        config.controls.movement.max_speed = f64::NAN;
        config.controls.interaction.activation_radius = f64::NAN;
        config.bodies[0].orbit_radius = f64::NAN;
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidMaxSpeed(v) if v.is_nan())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidActivationRadius(v) if v.is_nan())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidOrbitRadius { name, .. } if name == "Mercury")));
    }

    #[test]
    fn config_without_thruster_section_loads() {
        let mut value = serde_json::to_value(OrreryConfig::default()).unwrap();
        value["controls"]
            .as_object_mut()
            .unwrap()
            .remove("thruster");
        let config: OrreryConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.controls.thruster, ThrusterConfig::default());
    }

    #[test]
    fn json_round_trip_keeps_bodies() {
        let config = OrreryConfig::default();
        let json = config.to_json_pretty().unwrap();
        let back = OrreryConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }
}

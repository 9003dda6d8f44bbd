//! Engine hum model: gain envelope, tone and filter cutoff.
//!
//! The sound fades in when a movement intent starts and fades out when the
//! last one is released. While thrusting, tone and low-pass cutoff glide
//! toward values that rise with speed and jump a step while boosting. Hosts
//! read [`ThrusterSound::gain`] and [`ThrusterSound::pitch`] each frame and
//! apply them to whatever audio backend they have.

use crate::config::ThrusterConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ThrusterSound {
    config: ThrusterConfig,
    gain: f64,
    tone_hz: f64,
    cutoff_hz: f64,
    thrusting: bool,
}

/// Move `current` toward `target` by at most `step`.
fn ramp(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

impl ThrusterSound {
    pub fn new(config: ThrusterConfig) -> Self {
        let tone_hz = config.base_tone_hz;
        let cutoff_hz = config.filter_base_hz;
        Self {
            config,
            gain: 0.0,
            tone_hz,
            cutoff_hz,
            thrusting: false,
        }
    }

    /// Advance by `dt` seconds given this frame's movement, speed and boost.
    pub fn update(&mut self, dt: f64, moving: bool, speed: f64, boost: bool) {
        let cfg = &self.config;
        self.thrusting = moving;

        let (target_gain, fade) = if moving {
            (cfg.volume, cfg.fade_in_secs)
        } else {
            (0.0, cfg.fade_out_secs)
        };
        self.gain = if fade > 0.0 {
            ramp(self.gain, target_gain, cfg.volume * dt / fade)
        } else {
            target_gain
        };

        // Tone holds its last value while coasting, as the fade covers it.
        if moving {
            let (tone, cutoff) = self.targets(speed, boost);
            let t = if cfg.glide_secs > 0.0 {
                (dt / cfg.glide_secs).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.tone_hz += (tone - self.tone_hz) * t;
            self.cutoff_hz += (cutoff - self.cutoff_hz) * t;
        }
    }

    /// Tone and cutoff the glide is heading for.
    pub fn targets(&self, speed: f64, boost: bool) -> (f64, f64) {
        let cfg = &self.config;
        let pitch = if boost { cfg.boost_pitch } else { 1.0 };
        let tone = (cfg.base_tone_hz + speed * cfg.tone_per_speed) * pitch;
        let boost_hz = if boost { cfg.filter_boost_hz } else { 0.0 };
        let cutoff = (cfg.filter_base_hz + speed * cfg.filter_per_speed + boost_hz)
            .min(cfg.filter_max_hz);
        (tone, cutoff)
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn tone_hz(&self) -> f64 {
        self.tone_hz
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Playback rate relative to the resting tone.
    pub fn pitch(&self) -> f64 {
        if self.config.base_tone_hz > 0.0 {
            self.tone_hz / self.config.base_tone_hz
        } else {
            1.0
        }
    }

    pub fn is_thrusting(&self) -> bool {
        self.thrusting
    }

    /// Audible at all: thrusting or still fading out.
    pub fn is_audible(&self) -> bool {
        self.gain > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn sound() -> ThrusterSound {
        ThrusterSound::new(ThrusterConfig::default())
    }

    fn run(s: &mut ThrusterSound, secs: f64, moving: bool, speed: f64, boost: bool) {
        let frames = (secs / DT).round() as usize;
        for _ in 0..frames {
            s.update(DT, moving, speed, boost);
        }
    }

    #[test]
    fn silent_at_rest() {
        let mut s = sound();
        run(&mut s, 1.0, false, 0.0, false);
        assert_eq!(s.gain(), 0.0);
        assert!(!s.is_audible());
        assert_eq!(s.pitch(), 1.0);
    }

    #[test]
    fn fades_in_over_fade_in_time() {
        let mut s = sound();
        run(&mut s, 0.15, true, 1.0, false);
        assert!((s.gain() - 0.04).abs() < 1e-9, "half way: {}", s.gain());
        run(&mut s, 0.2, true, 1.0, false);
        assert!((s.gain() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn fades_out_slower_than_in() {
        let mut s = sound();
        run(&mut s, 1.0, true, 1.0, false);
        run(&mut s, 0.3, false, 1.0, false);
        assert!(s.is_audible(), "still fading after 0.3 s");
        assert!(!s.is_thrusting());
        run(&mut s, 0.25, false, 1.0, false);
        assert_eq!(s.gain(), 0.0);
    }

    #[test]
    fn tone_rises_with_speed_and_boost() {
        let s = sound();
        let (slow, _) = s.targets(1.0, false);
        let (fast, _) = s.targets(5.0, false);
        let (boosted, _) = s.targets(5.0, true);
        assert!((slow - 43.0).abs() < 1e-9);
        assert!(fast > slow);
        assert!((boosted - fast * 1.2).abs() < 1e-9);
    }

    #[test]
    fn cutoff_is_capped() {
        let s = sound();
        let (_, cutoff) = s.targets(10.0, false);
        assert!((cutoff - 700.0).abs() < 1e-9);
        let (_, boosted) = s.targets(15.0, true);
        assert_eq!(boosted, 800.0);
    }

    #[test]
    fn tone_glides_to_target() {
        let mut s = sound();
        run(&mut s, 3.0, true, 10.0, true);
        let (tone, cutoff) = s.targets(10.0, true);
        assert!((s.tone_hz() - tone).abs() < 1e-6);
        assert!((s.cutoff_hz() - cutoff).abs() < 1e-6);
        assert!(s.pitch() > 1.0);
    }

    #[test]
    fn zero_fade_switches_instantly() {
        let mut s = ThrusterSound::new(ThrusterConfig {
            fade_in_secs: 0.0,
            fade_out_secs: 0.0,
            ..ThrusterConfig::default()
        });
        s.update(DT, true, 0.0, false);
        assert_eq!(s.gain(), 0.08);
        s.update(DT, false, 0.0, false);
        assert_eq!(s.gain(), 0.0);
    }
}

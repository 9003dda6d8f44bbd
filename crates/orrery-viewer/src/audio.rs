//! Engine hum playback.
//!
//! There is no audio file: the hum is synthesized as a looping sine and
//! triangle mix at the resting tone, run through a one-pole low-pass. Each
//! frame `drive_thruster_audio` copies the session's thruster gain, pitch
//! and cutoff onto the playing sink.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bevy::audio::{AddAudioSource, AudioSinkPlayback, Decodable, Source, Volume};
use bevy::prelude::*;

use crate::state::Session;

const SAMPLE_RATE: u32 = 44_100;
const SINE_MIX: f32 = 0.7;
const TRIANGLE_MIX: f32 = 0.3;

/// Procedural hum. The cutoff is shared with the decoder on the audio thread.
#[derive(Asset, TypePath)]
pub struct ThrusterTone {
    tone_hz: f32,
    cutoff_hz: Arc<AtomicU32>,
}

impl ThrusterTone {
    fn new(tone_hz: f32, cutoff_hz: f32) -> Self {
        Self {
            tone_hz,
            cutoff_hz: Arc::new(AtomicU32::new(cutoff_hz.to_bits())),
        }
    }

    fn set_cutoff(&self, hz: f32) {
        self.cutoff_hz.store(hz.to_bits(), Ordering::Relaxed);
    }
}

pub struct ToneDecoder {
    phase: f32,
    step: f32,
    filtered: f32,
    cutoff_hz: Arc<AtomicU32>,
}

impl Iterator for ToneDecoder {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.phase = (self.phase + self.step).fract();
        let sine = (self.phase * TAU).sin();
        let triangle = 4.0 * (self.phase - 0.5).abs() - 1.0;
        let raw = sine * SINE_MIX + triangle * TRIANGLE_MIX;

        let cutoff = f32::from_bits(self.cutoff_hz.load(Ordering::Relaxed));
        let alpha = 1.0 - (-TAU * cutoff / SAMPLE_RATE as f32).exp();
        self.filtered += alpha * (raw - self.filtered);
        Some(self.filtered)
    }
}

impl Source for ToneDecoder {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Decodable for ThrusterTone {
    type DecoderItem = <ToneDecoder as Iterator>::Item;
    type Decoder = ToneDecoder;

    fn decoder(&self) -> Self::Decoder {
        ToneDecoder {
            phase: 0.0,
            step: self.tone_hz / SAMPLE_RATE as f32,
            filtered: 0.0,
            cutoff_hz: Arc::clone(&self.cutoff_hz),
        }
    }
}

#[derive(Component)]
pub struct ThrusterHum(Handle<ThrusterTone>);

pub struct ThrusterAudioPlugin;

impl Plugin for ThrusterAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_audio_source::<ThrusterTone>()
            .add_systems(Startup, spawn_thruster_audio);
    }
}

fn spawn_thruster_audio(
    mut commands: Commands,
    mut tones: ResMut<Assets<ThrusterTone>>,
    session: Res<Session>,
) {
    let sound = session.0.thruster();
    let handle = tones.add(ThrusterTone::new(
        sound.tone_hz() as f32,
        sound.cutoff_hz() as f32,
    ));
    commands.spawn((
        AudioPlayer(handle.clone()),
        PlaybackSettings::LOOP.with_volume(Volume::new(0.0)),
        ThrusterHum(handle),
    ));
}

/// Copy gain, pitch and cutoff from the session onto the sink.
pub fn drive_thruster_audio(
    session: Res<Session>,
    tones: Res<Assets<ThrusterTone>>,
    hum_q: Query<(&AudioSink, &ThrusterHum)>,
) {
    let Ok((sink, hum)) = hum_q.get_single() else {
        return;
    };
    let sound = session.0.thruster();
    sink.set_volume(sound.gain() as f32);
    sink.set_speed(sound.pitch() as f32);
    if let Some(tone) = tones.get(&hum.0) {
        tone.set_cutoff(sound.cutoff_hz() as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(tone: &ThrusterTone, samples: usize) -> f32 {
        tone.decoder()
            .skip(samples)
            .take(samples)
            .fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn samples_stay_in_range() {
        let tone = ThrusterTone::new(35.0, 800.0);
        assert!(tone.decoder().take(SAMPLE_RATE as usize).all(|s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn lower_cutoff_softens_the_hum() {
        let open = ThrusterTone::new(200.0, 800.0);
        let muffled = ThrusterTone::new(200.0, 50.0);
        assert!(peak(&muffled, 4_410) < peak(&open, 4_410));
    }

    #[test]
    fn cutoff_change_reaches_running_decoder() {
        let tone = ThrusterTone::new(35.0, 400.0);
        let decoder = tone.decoder();
        tone.set_cutoff(700.0);
        assert_eq!(f32::from_bits(decoder.cutoff_hz.load(Ordering::Relaxed)), 700.0);
    }
}

use std::{fmt, time::Duration};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rodio::Source;
use serde::{Deserialize, Serialize};

/// the annoying sound variants. all of them are synthesized, there are no
/// sound files to ship or pick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    #[default]
    Dialup,
    Beep,
    Squeal,
    Static,
    Chirp,
    Whine,
}

impl SoundKind {
    pub const ALL: [Self; 6] = [
        Self::Dialup,
        Self::Beep,
        Self::Squeal,
        Self::Static,
        Self::Chirp,
        Self::Whine,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dialup => "dial-up modem",
            Self::Beep => "piercing beeps",
            Self::Squeal => "electronic squeal",
            Self::Static => "radio static",
            Self::Chirp => "digital chirps",
            Self::Whine => "droning whine",
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Noise,
}

/// how the frequency moves across a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Hold,
    Linear,
    Exponential,
}

/// one synthesized segment of a sound pattern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub sweep: Sweep,
    pub millis: u64,
    /// relative gain, 0 gates a segment silent
    pub gain: f32,
}

impl Tone {
    const fn steady(waveform: Waveform, hz: f32, millis: u64) -> Self {
        Self {
            waveform,
            start_hz: hz,
            end_hz: hz,
            sweep: Sweep::Hold,
            millis,
            gain: 1.0,
        }
    }

    const fn silence(millis: u64) -> Self {
        Self {
            waveform: Waveform::Square,
            start_hz: 0.0,
            end_hz: 0.0,
            sweep: Sweep::Hold,
            millis,
            gain: 0.0,
        }
    }

    const fn sweep(
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        sweep: Sweep,
        millis: u64,
    ) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            sweep,
            millis,
            gain: 1.0,
        }
    }

    fn frequency_at(&self, progress: f32) -> f32 {
        match self.sweep {
            Sweep::Hold => self.start_hz,
            Sweep::Linear => self.start_hz + (self.end_hz - self.start_hz) * progress,
            Sweep::Exponential => self.start_hz * (self.end_hz / self.start_hz).powf(progress),
        }
    }
}

/// modem carrier/dtmf tones stepped through like a handshake
const DIALUP_HZ: [f32; 8] = [1209.0, 1336.0, 1477.0, 1633.0, 697.0, 770.0, 852.0, 941.0];

/// one full cycle of the pattern for a sound kind
fn pattern(kind: SoundKind) -> Vec<Tone> {
    match kind {
        SoundKind::Dialup => DIALUP_HZ
            .iter()
            .map(|&hz| Tone::steady(Waveform::Sine, hz, 200))
            .collect(),
        SoundKind::Beep => vec![
            Tone::steady(Waveform::Square, 2000.0, 250),
            Tone::silence(50),
        ],
        SoundKind::Squeal => vec![
            Tone::sweep(Waveform::Sawtooth, 800.0, 3000.0, Sweep::Exponential, 2000),
            Tone::sweep(Waveform::Sawtooth, 3000.0, 800.0, Sweep::Exponential, 2000),
        ],
        SoundKind::Static => vec![Tone::steady(Waveform::Noise, 0.0, 1000)],
        SoundKind::Chirp => (0..15)
            .map(|step| Tone::steady(Waveform::Sine, 1000.0 + 200.0 * step as f32, 150))
            .collect(),
        SoundKind::Whine => vec![
            Tone::sweep(Waveform::Triangle, 400.0, 600.0, Sweep::Linear, 1000),
            Tone::sweep(Waveform::Triangle, 600.0, 400.0, Sweep::Linear, 1000),
        ],
    }
}

/// the full list of segments for one playback, the pattern cycled and the
/// last segment clipped so the total is exactly `duration_seconds`
#[must_use]
pub fn tone_sequence(kind: SoundKind, duration_seconds: u32) -> Vec<Tone> {
    let pattern = pattern(kind);
    let mut remaining = u64::from(duration_seconds) * 1000;
    let mut sequence = Vec::new();
    'fill: loop {
        for tone in &pattern {
            if remaining == 0 {
                break 'fill;
            }
            let millis = tone.millis.min(remaining);
            sequence.push(Tone { millis, ..*tone });
            remaining -= millis;
        }
    }
    sequence
}

const SAMPLE_RATE: u32 = 44_100;

/// renders one [`Tone`] as a mono rodio source
pub struct ToneSource {
    tone: Tone,
    total_samples: u64,
    emitted: u64,
    phase: f32,
    noise: SmallRng,
}

impl ToneSource {
    #[must_use]
    pub fn new(tone: Tone) -> Self {
        Self {
            tone,
            total_samples: tone.millis * u64::from(SAMPLE_RATE) / 1000,
            emitted: 0,
            phase: 0.0,
            noise: SmallRng::from_entropy(),
        }
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.emitted >= self.total_samples {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let progress = self.emitted as f32 / self.total_samples.max(1) as f32;
        let sample = match self.tone.waveform {
            Waveform::Sine => (std::f32::consts::TAU * self.phase).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            Waveform::Noise => self.noise.gen_range(-1.0f32..=1.0),
        };
        self.phase = (self.phase + self.tone.frequency_at(progress) / SAMPLE_RATE as f32).fract();
        self.emitted += 1;
        Some(sample * self.tone.gain)
    }
}

impl Source for ToneSource {
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
        Some(Duration::from_millis(self.tone.millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_millis(sequence: &[Tone]) -> u64 {
        sequence.iter().map(|tone| tone.millis).sum()
    }

    #[test]
    fn sequence_fills_the_requested_duration_exactly() {
        for kind in SoundKind::ALL {
            for seconds in [1, 7, 10, 30] {
                let sequence = tone_sequence(kind, seconds);
                assert_eq!(
                    total_millis(&sequence),
                    u64::from(seconds) * 1000,
                    "{kind} at {seconds}s"
                );
            }
        }
    }

    #[test]
    fn static_is_one_long_noise_span() {
        let sequence = tone_sequence(SoundKind::Static, 10);
        assert!(sequence
            .iter()
            .all(|tone| tone.waveform == Waveform::Noise && tone.gain == 1.0));
        assert_eq!(total_millis(&sequence), 10_000);
    }

    #[test]
    fn beeps_are_gated_by_silent_gaps() {
        let sequence = tone_sequence(SoundKind::Beep, 3);
        assert!(sequence.iter().any(|tone| tone.gain == 0.0));
        assert!(sequence
            .iter()
            .filter(|tone| tone.gain > 0.0)
            .all(|tone| tone.waveform == Waveform::Square && tone.start_hz == 2000.0));
    }

    #[test]
    fn chirps_step_upward() {
        let steps: Vec<f32> = pattern(SoundKind::Chirp)
            .iter()
            .map(|tone| tone.start_hz)
            .collect();
        assert_eq!(steps.first(), Some(&1000.0));
        assert!(steps.windows(2).all(|pair| pair[1] - pair[0] == 200.0));
    }

    #[test]
    fn sweep_frequency_hits_both_endpoints() {
        let squeal = Tone::sweep(Waveform::Sawtooth, 800.0, 3000.0, Sweep::Exponential, 2000);
        assert!((squeal.frequency_at(0.0) - 800.0).abs() < f32::EPSILON);
        assert!((squeal.frequency_at(1.0) - 3000.0).abs() < 0.5);

        let whine = Tone::sweep(Waveform::Triangle, 400.0, 600.0, Sweep::Linear, 1000);
        assert!((whine.frequency_at(0.5) - 500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn source_emits_the_right_number_of_samples() {
        let tone = Tone::steady(Waveform::Sine, 440.0, 500);
        let samples: Vec<f32> = ToneSource::new(tone).collect();
        assert_eq!(samples.len(), 22_050);
        assert!(samples.iter().all(|sample| (-1.0..=1.0).contains(sample)));
    }

    #[test]
    fn gated_segments_come_out_silent() {
        let samples: Vec<f32> = ToneSource::new(Tone::silence(100)).collect();
        assert!(!samples.is_empty());
        assert!(samples.iter().all(|&sample| sample == 0.0));
    }
}

use anyhow::{bail, Result};
use std::f64::consts::TAU;
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Single-channel block of rendered samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl MonoBuffer {
    /// Render a unit-amplitude sine tone.
    pub fn tone(freq: f64, duration_secs: f64, sample_rate: u32) -> Self {
        let len = seconds_to_samples(duration_secs, sample_rate);
        let step = TAU * freq / sample_rate as f64;
        let samples = (0..len).map(|n| (step * n as f64).sin() as f32).collect();

        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Linear ramp from silence over the first `secs` seconds.
    pub fn fade_in(mut self, secs: f64) -> Self {
        let ramp = self.ramp_len(secs);
        for (i, sample) in self.samples.iter_mut().take(ramp).enumerate() {
            *sample *= i as f32 / ramp as f32;
        }
        self
    }

    /// Linear ramp to silence over the last `secs` seconds.
    pub fn fade_out(mut self, secs: f64) -> Self {
        let ramp = self.ramp_len(secs);
        let len = self.samples.len();
        for (i, sample) in self.samples.iter_mut().skip(len - ramp).enumerate() {
            *sample *= 1.0 - (i + 1) as f32 / ramp as f32;
        }
        self
    }

    fn ramp_len(&self, secs: f64) -> usize {
        seconds_to_samples(secs, self.sample_rate).min(self.samples.len())
    }
}

/// Interleaved two-channel buffer, left sample first.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl StereoBuffer {
    pub fn from_mono(left: MonoBuffer, right: MonoBuffer) -> Result<Self> {
        if left.sample_rate != right.sample_rate {
            bail!(
                "channel sample rates differ: {} vs {}",
                left.sample_rate,
                right.sample_rate
            );
        }
        if left.len() != right.len() {
            bail!("channel lengths differ: {} vs {}", left.len(), right.len());
        }

        let samples = left
            .samples
            .iter()
            .zip(right.samples.iter())
            .flat_map(|(l, r)| [*l, *r])
            .collect();

        Ok(Self {
            samples,
            sample_rate: left.sample_rate,
        })
    }

    /// Scale every sample by a gain expressed in decibels.
    pub fn apply_gain_db(mut self, db: f64) -> Self {
        let factor = 10f64.powf(db / 20.0) as f32;
        for sample in &mut self.samples {
            *sample *= factor;
        }
        self
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Samples of one channel (0 = left, 1 = right).
    pub fn channel(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().skip(index).step_by(2).copied()
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

fn seconds_to_samples(secs: f64, sample_rate: u32) -> usize {
    (secs.max(0.0) * sample_rate as f64).round() as usize
}

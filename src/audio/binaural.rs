use serde::{Deserialize, Serialize};

use super::buffer::{MonoBuffer, StereoBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{ConfigError, FrequencyOutOfRange, SynthError};

pub const MIN_AUDIBLE_HZ: f64 = 20.0;
pub const MAX_AUDIBLE_HZ: f64 = 20000.0;

/// Mapping from the 0..=1 amplitude setting to a gain shift in dB.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum GainCurve {
    /// `amplitude * 20 - 20` dB: 1.0 is unity, 0.0 is -20 dB.
    #[default]
    Linear,
    /// `20 * log10(amplitude)` dB: 0.0 is silence.
    #[value(alias = "log")]
    Logarithmic,
}

impl GainCurve {
    pub fn gain_db(self, amplitude: f64) -> f64 {
        match self {
            GainCurve::Linear => amplitude * 20.0 - 20.0,
            GainCurve::Logarithmic => 20.0 * amplitude.log10(),
        }
    }
}

/// Render settings. Only constructible with a non-zero sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthSettings {
    sample_rate: u32,
    gain_curve: GainCurve,
}

impl SynthSettings {
    pub fn new(sample_rate: u32, gain_curve: GainCurve) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        Ok(Self {
            sample_rate,
            gain_curve,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn gain_curve(&self) -> GainCurve {
        self.gain_curve
    }
}

impl Default for SynthSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            gain_curve: GainCurve::Linear,
        }
    }
}

/// Shift a frequency down by `octaves` octaves.
pub fn lower_octave(freq: f64, octaves: u32) -> f64 {
    freq / 2f64.powi(octaves as i32)
}

pub fn is_audible(freq: f64) -> bool {
    (MIN_AUDIBLE_HZ..=MAX_AUDIBLE_HZ).contains(&freq)
}

/// Renders binaural beats: one pure tone per ear, detuned by the beat frequency.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeatSynthesizer {
    settings: SynthSettings,
}

impl BeatSynthesizer {
    pub fn new(settings: SynthSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> SynthSettings {
        self.settings
    }

    pub fn validate(left_freq: f64, right_freq: f64) -> Result<(), FrequencyOutOfRange> {
        if is_audible(left_freq) && is_audible(right_freq) {
            Ok(())
        } else {
            Err(FrequencyOutOfRange {
                left: left_freq,
                right: right_freq,
            })
        }
    }

    /// Build the finished stereo buffer for one beat. Fades are skipped when
    /// `transition_secs` is zero.
    pub fn synthesize(
        &self,
        left_freq: f64,
        right_freq: f64,
        duration_secs: f64,
        transition_secs: f64,
        amplitude: f64,
    ) -> Result<StereoBuffer, SynthError> {
        Self::validate(left_freq, right_freq)?;

        let rate = self.settings.sample_rate;
        let left = self.ear(left_freq, duration_secs, transition_secs, rate);
        let right = self.ear(right_freq, duration_secs, transition_secs, rate);

        let stereo = StereoBuffer::from_mono(left, right)
            .map_err(|err| SynthError::Combine(err.to_string()))?;

        let db = self.settings.gain_curve.gain_db(amplitude);
        Ok(if db.is_finite() {
            stereo.apply_gain_db(db)
        } else {
            silence(stereo)
        })
    }

    fn ear(&self, freq: f64, duration_secs: f64, transition_secs: f64, rate: u32) -> MonoBuffer {
        let tone = MonoBuffer::tone(freq, duration_secs, rate);
        if transition_secs > 0.0 {
            tone.fade_in(transition_secs).fade_out(transition_secs)
        } else {
            tone
        }
    }
}

fn silence(mut stereo: StereoBuffer) -> StereoBuffer {
    stereo.samples.iter_mut().for_each(|s| *s = 0.0);
    stereo
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_RATE: u32 = 1000;

    fn synth(curve: GainCurve) -> BeatSynthesizer {
        BeatSynthesizer::new(SynthSettings::new(TEST_RATE, curve).unwrap())
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        assert_eq!(
            SynthSettings::new(0, GainCurve::Linear),
            Err(ConfigError::SampleRate)
        );
        assert_eq!(SynthSettings::new(44100, GainCurve::Linear), Ok(SynthSettings::default()));
    }

    #[test]
    fn buffer_length_matches_play_time() {
        let buffer = synth(GainCurve::Linear)
            .synthesize(295.0, 305.0, 2.0, 1.0, 0.5)
            .unwrap();
        assert_eq!(buffer.frames(), 2000);
        assert!((buffer.duration().as_secs_f64() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_ear_below_audible_range() {
        let err = synth(GainCurve::Linear)
            .synthesize(10.0, 50.0, 1.0, 0.0, 0.5)
            .unwrap_err();
        assert_eq!(
            err,
            SynthError::OutOfRange(FrequencyOutOfRange {
                left: 10.0,
                right: 50.0
            })
        );
    }

    #[test]
    fn channels_carry_each_ear_tone() {
        let buffer = synth(GainCurve::Linear)
            .synthesize(200.0, 300.0, 0.5, 0.0, 1.0)
            .unwrap();
        let left = MonoBuffer::tone(200.0, 0.5, TEST_RATE);
        let right = MonoBuffer::tone(300.0, 0.5, TEST_RATE);
        assert_eq!(buffer.channel(0).collect::<Vec<_>>(), left.samples);
        assert_eq!(buffer.channel(1).collect::<Vec<_>>(), right.samples);
    }

    #[test]
    fn rejects_ear_above_audible_range() {
        assert!(synth(GainCurve::Linear)
            .synthesize(19990.0, 20010.0, 1.0, 0.0, 0.5)
            .is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(BeatSynthesizer::validate(20.0, 20000.0).is_ok());
        assert!(BeatSynthesizer::validate(19.99, 20000.0).is_err());
    }

    #[test]
    fn linear_curve_matches_db_shift() {
        assert_eq!(GainCurve::Linear.gain_db(1.0), 0.0);
        assert_eq!(GainCurve::Linear.gain_db(0.0), -20.0);
        assert_eq!(GainCurve::Linear.gain_db(0.5), -10.0);
    }

    #[test]
    fn logarithmic_curve_matches_db_shift() {
        assert_eq!(GainCurve::Logarithmic.gain_db(1.0), 0.0);
        assert!((GainCurve::Logarithmic.gain_db(0.1) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn unity_amplitude_without_transition_starts_at_full_level() {
        let buffer = synth(GainCurve::Linear)
            .synthesize(250.0, 250.0, 1.0, 0.0, 1.0)
            .unwrap();
        // Quarter period of 250 Hz at 1 kHz is one sample.
        let left: Vec<f32> = buffer.channel(0).take(2).collect();
        assert!((left[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transition_fades_both_ends() {
        let buffer = synth(GainCurve::Linear)
            .synthesize(250.0, 250.0, 2.0, 1.0, 1.0)
            .unwrap();
        let left: Vec<f32> = buffer.channel(0).collect();
        assert!(left[1].abs() < 0.01);
        assert!(left[1001].abs() > 0.99);
        assert!(left[1997].abs() < 0.01);
    }

    #[test]
    fn zero_amplitude_is_silent_on_log_curve() {
        let buffer = synth(GainCurve::Logarithmic)
            .synthesize(300.0, 310.0, 0.5, 0.0, 0.0)
            .unwrap();
        assert_eq!(buffer.peak(), 0.0);
    }

    #[test]
    fn zero_amplitude_is_minus_20_db_on_linear_curve() {
        let buffer = synth(GainCurve::Linear)
            .synthesize(250.0, 250.0, 0.5, 0.0, 0.0)
            .unwrap();
        assert!((buffer.peak() - 0.1).abs() < 1e-3);
    }

    #[test]
    fn lowering_octaves_composes() {
        let f = 440.0;
        for a in 0..4 {
            for b in 0..4 {
                assert_eq!(lower_octave(lower_octave(f, a), b), lower_octave(f, a + b));
            }
        }
        assert_eq!(lower_octave(f, 1), 220.0);
    }
}

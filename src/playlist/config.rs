use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// How a run paces its beats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    /// Each beat runs as its own task; the next one starts `transition`
    /// seconds before the previous one ends.
    #[default]
    Concurrent,
    /// Each beat plays to the end, followed by a `transition` pause.
    Sequential,
}

/// Timing and loudness for one playback run. Validated on construction and
/// immutable afterwards.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistConfig {
    play_time: Duration,
    transition: Duration,
    amplitude: f64,
    lower_octaves: u32,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            play_time: Duration::from_secs(600),
            transition: Duration::from_secs(5),
            amplitude: 0.3,
            lower_octaves: 0,
        }
    }
}

impl PlaylistConfig {
    pub fn new(
        play_time_secs: f64,
        transition_secs: f64,
        amplitude: f64,
        lower_octaves: i32,
    ) -> Result<Self, ConfigError> {
        let play_time = Duration::try_from_secs_f64(play_time_secs)
            .map_err(|_| ConfigError::PlayTime(play_time_secs))?;
        let transition = Duration::try_from_secs_f64(transition_secs)
            .map_err(|_| ConfigError::TransitionTime(transition_secs))?;
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(ConfigError::Amplitude(amplitude));
        }
        let lower_octaves =
            u32::try_from(lower_octaves).map_err(|_| ConfigError::LowerOctaves(lower_octaves))?;

        Ok(Self {
            play_time,
            transition,
            amplitude,
            lower_octaves,
        })
    }

    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    pub fn play_time_secs(&self) -> f64 {
        self.play_time.as_secs_f64()
    }

    pub fn transition_secs(&self) -> f64 {
        self.transition.as_secs_f64()
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn lower_octaves(&self) -> u32 {
        self.lower_octaves
    }

    /// Gap between two concurrent dispatches: `max(0, play_time - transition)`.
    pub fn dispatch_interval(&self) -> Duration {
        self.play_time.saturating_sub(self.transition)
    }

    pub fn transition(&self) -> Duration {
        self.transition
    }
}

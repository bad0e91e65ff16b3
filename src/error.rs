//! Error types for configuration, synthesis and playback runs.

use thiserror::Error;

/// Rejected playlist configuration. Raised at construction, never mid-run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("play_time must be a non-negative number of seconds, got {0}")]
    PlayTime(f64),
    #[error("transition_time must be a non-negative number of seconds, got {0}")]
    TransitionTime(f64),
    #[error("amplitude must be between 0 and 1, got {0}")]
    Amplitude(f64),
    #[error("lower_octaves must be non-negative, got {0}")]
    LowerOctaves(i32),
    #[error("sample_rate must be greater than zero")]
    SampleRate,
}

/// One or both ear frequencies fall outside the audible range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error(
    "one or both frequencies are outside the safe hearing range (20 Hz - 20,000 Hz): left {left} Hz, right {right} Hz"
)]
pub struct FrequencyOutOfRange {
    pub left: f64,
    pub right: f64,
}

/// Why a beat could not be rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error(transparent)]
    OutOfRange(#[from] FrequencyOutOfRange),
    #[error("failed to combine ear channels: {0}")]
    Combine(String),
}

/// Reasons a playback run ends without completing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayError {
    #[error("scale '{0}' not found in frequency dictionary")]
    UnknownScale(String),
    #[error("playback run cancelled")]
    Cancelled,
}

/// Process exit codes reported by the binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const UNKNOWN_SCALE: i32 = 3;
    pub const CANCELLED: i32 = 4;
}

impl PlayError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PlayError::UnknownScale(_) => exit_code::UNKNOWN_SCALE,
            PlayError::Cancelled => exit_code::CANCELLED,
        }
    }
}

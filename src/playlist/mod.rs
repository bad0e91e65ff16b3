pub mod config;
pub mod presets;

pub use config::{PlaybackMode, PlaylistConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::Path};

use crate::audio::lower_octave;

/// One entry of a session: either a center/beat pair or explicit ear frequencies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FrequencySpec {
    CenterBeat { center: f64, beat: f64 },
    LeftRight { left: f64, right: f64 },
}

impl FrequencySpec {
    pub fn center_beat(center: f64, beat: f64) -> Self {
        FrequencySpec::CenterBeat { center, beat }
    }

    pub fn left_right(left: f64, right: f64) -> Self {
        FrequencySpec::LeftRight { left, right }
    }

    /// Left and right ear frequencies. Octave lowering only applies to the
    /// center of a center/beat pair.
    pub fn ear_frequencies(&self, lower_octaves: u32) -> (f64, f64) {
        match *self {
            FrequencySpec::CenterBeat { center, beat } => {
                let center = lower_octave(center, lower_octaves);
                (center - beat / 2.0, center + beat / 2.0)
            }
            FrequencySpec::LeftRight { left, right } => (left, right),
        }
    }
}

/// Named scales, each an ordered sequence of beats played in list order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Playlist {
    scales: HashMap<String, Vec<FrequencySpec>>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, name: impl Into<String>, specs: Vec<FrequencySpec>) -> Self {
        self.insert(name, specs);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, specs: Vec<FrequencySpec>) {
        self.scales.insert(name.into(), specs);
    }

    pub fn get(&self, scale: &str) -> Option<&[FrequencySpec]> {
        self.scales.get(scale).map(Vec::as_slice)
    }

    pub fn scale_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scales.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid playlist JSON")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read playlist from {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse playlist {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_beat_splits_around_center() {
        let spec = FrequencySpec::center_beat(300.0, 10.0);
        assert_eq!(spec.ear_frequencies(0), (295.0, 305.0));
    }

    #[test]
    fn octave_lowering_applies_to_center_only() {
        let spec = FrequencySpec::center_beat(400.0, 8.0);
        assert_eq!(spec.ear_frequencies(1), (196.0, 204.0));
    }

    #[test]
    fn left_right_pair_is_never_lowered() {
        let spec = FrequencySpec::left_right(200.0, 207.83);
        assert_eq!(spec.ear_frequencies(3), (200.0, 207.83));
    }

    #[test]
    fn parses_both_representations_in_order() {
        let playlist = Playlist::from_json_str(
            r#"{"mixed": [{"center": 300, "beat": 10}, {"left": 200, "right": 204}]}"#,
        )
        .unwrap();
        assert_eq!(
            playlist.get("mixed").unwrap(),
            &[
                FrequencySpec::center_beat(300.0, 10.0),
                FrequencySpec::left_right(200.0, 204.0),
            ]
        );
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(Playlist::from_json_str(r#"{"bad": [{"center": 300}]}"#).is_err());
    }

    #[test]
    fn unknown_scale_is_none() {
        let playlist = Playlist::new().with_scale("test", vec![]);
        assert!(playlist.get("test").is_some());
        assert!(playlist.get("nonexistent_scale").is_none());
        assert_eq!(playlist.scale_names(), vec!["test"]);
    }
}

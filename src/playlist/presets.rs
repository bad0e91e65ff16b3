//! Built-in frequency tables.
//!
//! Beat frequencies are the difference between the two ear tones; scales list
//! the center tone each beat is split around.

use super::{FrequencySpec, Playlist};

/// Schumann resonance, used as the beat for the solfeggio scale.
pub const SCHUMANN_HZ: f64 = 7.83;

pub const BEATS: &[(&str, f64)] = &[
    ("kundalini_awakening", 55.0),
    ("memory_enhancer", 40.0),
    ("zen_focus", 14.0),
    ("love_meditation", 12.5),
    ("astral_projection", 12.0),
    ("tantric_stimulation", 9.0),
    ("anxiety_release", 8.6),
    ("positive_thinking", 8.0),
    ("schumann", SCHUMANN_HZ),
    ("spiritual_awakening", 7.5),
    ("lucid_dreaming", 7.0),
    ("chill_pill", 6.0),
    ("deep_meditation", 5.0),
    ("tinnitus_relief", 4.0),
    ("blissful_sleep", 3.9),
    ("power_nap", 3.4),
];

// Crown down to root.
const CHAKRA: &[(f64, f64)] = &[
    (480.0, SCHUMANN_HZ),
    (440.0, 7.5),
    (392.0, 7.0),
    (329.63, 6.0),
    (261.63, 5.0),
    (210.0, 4.0),
    (194.0, 3.9),
];

const SOLFEGGIO: &[f64] = &[396.0, 417.0, 528.0, 639.0, 741.0, 852.0, 963.0];

pub fn beat(name: &str) -> Option<f64> {
    BEATS
        .iter()
        .find(|(beat_name, _)| *beat_name == name)
        .map(|(_, hz)| *hz)
}

pub fn chakra() -> Vec<FrequencySpec> {
    CHAKRA
        .iter()
        .map(|&(center, beat)| FrequencySpec::center_beat(center, beat))
        .collect()
}

pub fn solfeggio() -> Vec<FrequencySpec> {
    SOLFEGGIO
        .iter()
        .map(|&center| FrequencySpec::center_beat(center, SCHUMANN_HZ))
        .collect()
}

impl Playlist {
    pub fn presets() -> Self {
        Playlist::new()
            .with_scale("chakra", chakra())
            .with_scale("solfeggio", solfeggio())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chakra_beats_come_from_the_named_table() {
        let specs = chakra();
        assert_eq!(specs.len(), 7);
        assert_eq!(
            specs[0],
            FrequencySpec::center_beat(480.0, beat("schumann").unwrap())
        );
        assert_eq!(
            specs[6],
            FrequencySpec::center_beat(194.0, beat("blissful_sleep").unwrap())
        );
    }

    #[test]
    fn presets_stay_audible_when_lowered_an_octave() {
        let playlist = Playlist::presets();
        for name in playlist.scale_names() {
            for spec in playlist.get(name).unwrap() {
                let (left, right) = spec.ear_frequencies(1);
                assert!(left >= 20.0 && right <= 20000.0, "{name}: {spec:?}");
            }
        }
    }

    #[test]
    fn unknown_beat_name() {
        assert_eq!(beat("nope"), None);
    }
}

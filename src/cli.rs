//! Command-line argument parsing.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::audio::{GainCurve, SynthSettings};
use crate::error::{exit_code, ConfigError};
use crate::playlist::{PlaybackMode, Playlist, PlaylistConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "binaural-playlist")]
#[command(about = "Play a sequence of binaural beats", long_about = None)]
pub struct Args {
    /// Scale to play from the playlist
    #[arg(long, short, value_name = "NAME", default_value = "chakra")]
    pub scale: String,

    /// JSON playlist file; the built-in chakra/solfeggio scales are used when omitted
    #[arg(long, value_name = "FILE")]
    pub playlist: Option<PathBuf>,

    /// Duration of each beat
    #[arg(long, value_name = "SECONDS", default_value = "600", allow_negative_numbers = true)]
    pub play_time: f64,

    /// Fade in/out duration, also the overlap between consecutive beats
    #[arg(long, value_name = "SECONDS", default_value = "5", allow_negative_numbers = true)]
    pub transition: f64,

    /// Loudness between 0 and 1
    #[arg(long, default_value = "0.3", allow_negative_numbers = true)]
    pub amplitude: f64,

    /// Octaves to lower each center frequency by
    #[arg(long, value_name = "N", default_value = "0", allow_negative_numbers = true)]
    pub lower_octaves: i32,

    #[arg(long, value_enum, default_value_t = PlaybackMode::Concurrent)]
    pub mode: PlaybackMode,

    /// How amplitude maps to gain
    #[arg(long, value_enum, default_value_t = GainCurve::Linear)]
    pub gain_curve: GainCurve,

    #[arg(long, value_name = "HZ", default_value = "44100")]
    pub sample_rate: u32,

    /// Print the available scale names and exit
    #[arg(long)]
    pub list: bool,
}

impl Args {
    /// Parse arguments without letting clap pick the exit code. Help and
    /// version output map to success, malformed arguments to
    /// [`exit_code::FAILURE`]; exit code 2 stays reserved for rejected
    /// configuration values.
    pub fn parse_or_exit_code<I, T>(args: I) -> Result<Self, i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|err| {
            let _ = err.print();
            if err.use_stderr() {
                exit_code::FAILURE
            } else {
                exit_code::SUCCESS
            }
        })
    }

    pub fn playlist_config(&self) -> Result<PlaylistConfig, ConfigError> {
        PlaylistConfig::new(
            self.play_time,
            self.transition,
            self.amplitude,
            self.lower_octaves,
        )
    }

    pub fn synth_settings(&self) -> Result<SynthSettings, ConfigError> {
        SynthSettings::new(self.sample_rate, self.gain_curve)
    }

    pub fn load_playlist(&self) -> Result<Playlist> {
        match &self.playlist {
            Some(path) => Playlist::from_json_file(path),
            None => Ok(Playlist::presets()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_presets() {
        let args = Args::parse_from(["binaural-playlist"]);
        assert_eq!(args.scale, "chakra");
        assert_eq!(args.mode, PlaybackMode::Concurrent);
        assert_eq!(args.playlist_config().unwrap(), PlaylistConfig::default());
        assert!(args.load_playlist().unwrap().get("chakra").is_some());
    }

    #[test]
    fn negative_values_reach_validation() {
        let args = Args::parse_from(["binaural-playlist", "--play-time", "-3"]);
        assert_eq!(args.playlist_config(), Err(ConfigError::PlayTime(-3.0)));
    }

    #[test]
    fn parses_mode_and_curve() {
        let args = Args::parse_from([
            "binaural-playlist",
            "--mode",
            "sequential",
            "--gain-curve",
            "logarithmic",
        ]);
        assert_eq!(args.mode, PlaybackMode::Sequential);
        assert_eq!(args.synth_settings().unwrap().gain_curve(), GainCurve::Logarithmic);
    }

    #[test]
    fn log_is_an_alias_for_logarithmic() {
        let args = Args::parse_from(["binaural-playlist", "--gain-curve", "log"]);
        assert_eq!(args.gain_curve, GainCurve::Logarithmic);
    }

    #[test]
    fn malformed_arguments_do_not_use_the_config_exit_code() {
        let code = Args::parse_or_exit_code(["binaural-playlist", "--amplitude", "loud"]).unwrap_err();
        assert_eq!(code, exit_code::FAILURE);
        assert_ne!(code, exit_code::CONFIG);

        let code = Args::parse_or_exit_code(["binaural-playlist", "--no-such-flag"]).unwrap_err();
        assert_eq!(code, exit_code::FAILURE);
    }

    #[test]
    fn help_exits_successfully() {
        let code = Args::parse_or_exit_code(["binaural-playlist", "--help"]).unwrap_err();
        assert_eq!(code, exit_code::SUCCESS);
    }

    #[test]
    fn out_of_range_values_parse_and_fail_validation() {
        let args = Args::parse_or_exit_code(["binaural-playlist", "--amplitude", "2"]).unwrap();
        assert_eq!(args.playlist_config(), Err(ConfigError::Amplitude(2.0)));
    }

    #[test]
    fn zero_sample_rate_is_rejected() {
        let args = Args::parse_from(["binaural-playlist", "--sample-rate", "0"]);
        assert_eq!(args.synth_settings(), Err(ConfigError::SampleRate));
    }
}

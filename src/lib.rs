pub mod audio;
pub mod cli;
pub mod error;
pub mod playlist;
pub mod scheduler;
mod utils;

use log::{error, info, warn};
use std::sync::Arc;

pub use audio::{BeatSynthesizer, DeviceOutput, GainCurve, PlaybackSink, StereoBuffer, SynthSettings};
pub use error::{exit_code, ConfigError, FrequencyOutOfRange, PlayError, SynthError};
pub use playlist::{FrequencySpec, PlaybackMode, Playlist, PlaylistConfig};
pub use scheduler::{BeatStatus, PlaylistScheduler, RunReport};

use cli::Args;

/// Process entry point. Returns the exit code: 0 when the run completes,
/// see [`exit_code`] for the failure codes.
pub fn run() -> i32 {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse_or_exit_code(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code,
    };

    let playlist = match args.load_playlist() {
        Ok(playlist) => playlist,
        Err(err) => {
            error!("{err:#}");
            return exit_code::FAILURE;
        }
    };

    if args.list {
        for name in playlist.scale_names() {
            println!("{name}");
        }
        return exit_code::SUCCESS;
    }

    let (config, synth_settings) = match (args.playlist_config(), args.synth_settings()) {
        (Ok(config), Ok(settings)) => (config, settings),
        (Err(err), _) | (_, Err(err)) => {
            error!("Invalid configuration: {err}");
            return exit_code::CONFIG;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start async runtime: {err}");
            return exit_code::FAILURE;
        }
    };

    let scheduler = PlaylistScheduler::new(
        playlist,
        config,
        args.mode,
        BeatSynthesizer::new(synth_settings),
        Arc::new(DeviceOutput::new()),
    );

    runtime.block_on(async move {
        let token = scheduler.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping playback");
                token.cancel();
            }
        });

        match scheduler.play(&args.scale).await {
            Ok(report) => {
                info!(
                    "Session '{}' complete: {} of {} beats played",
                    report.scale,
                    report.played(),
                    report.beats.len()
                );
                exit_code::SUCCESS
            }
            Err(err) => {
                error!("{err}");
                err.exit_code()
            }
        }
    })
}

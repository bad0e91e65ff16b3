pub mod report;
pub mod task_group;

pub use report::{BeatOutcome, BeatStatus, RunReport};
pub use task_group::BeatTaskGroup;

use chrono::Utc;
use std::sync::Arc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::audio::{BeatSynthesizer, PlaybackSink};
use crate::error::{PlayError, SynthError};
use crate::playlist::{FrequencySpec, PlaybackMode, Playlist, PlaylistConfig};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Drives a playlist scale through the synthesizer and out to the sink.
///
/// Configuration is validated before it gets here, so a scheduler can only
/// exist with bounds-checked timing and amplitude. Cancelling the scheduler's
/// token stops pacing, silences the sink and ends the current run; a
/// cancelled scheduler stays cancelled.
pub struct PlaylistScheduler {
    playlist: Playlist,
    config: PlaylistConfig,
    mode: PlaybackMode,
    synth: BeatSynthesizer,
    sink: Arc<dyn PlaybackSink>,
    cancel_token: CancellationToken,
}

/// Everything one beat task needs, owned so the task can outlive the loop
/// iteration that spawned it.
struct BeatJob {
    index: usize,
    left_hz: f64,
    right_hz: f64,
    config: PlaylistConfig,
    synth: BeatSynthesizer,
    sink: Arc<dyn PlaybackSink>,
}

impl PlaylistScheduler {
    pub fn new(
        playlist: Playlist,
        config: PlaylistConfig,
        mode: PlaybackMode,
        synth: BeatSynthesizer,
        sink: Arc<dyn PlaybackSink>,
    ) -> Self {
        Self {
            playlist,
            config,
            mode,
            synth,
            sink,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PlaylistConfig {
        &self.config
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub async fn play(&self, scale: &str) -> Result<RunReport, PlayError> {
        let Some(specs) = self.playlist.get(scale) else {
            log_error!("Scale '{}' not found in frequency dictionary.", scale);
            return Err(PlayError::UnknownScale(scale.to_string()));
        };
        if self.cancel_token.is_cancelled() {
            return Err(PlayError::Cancelled);
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log_info!(
            "Run {} starting: scale '{}', {} beats, {:?} mode",
            run_id,
            scale,
            specs.len(),
            self.mode
        );

        let beats = match self.mode {
            PlaybackMode::Concurrent => self.play_concurrent(specs).await,
            PlaybackMode::Sequential => self.play_sequential(specs).await,
        };

        if self.cancel_token.is_cancelled() {
            log_warn!("Run {} cancelled", run_id);
            return Err(PlayError::Cancelled);
        }

        let report = RunReport {
            run_id,
            scale: scale.to_string(),
            mode: self.mode,
            started_at,
            finished_at: Utc::now(),
            beats,
        };
        log_info!(
            "Finished run {}: {} played, {} rejected",
            run_id,
            report.played(),
            report.rejected()
        );
        Ok(report)
    }

    /// Dispatch each beat as its own task, sleeping `play_time - transition`
    /// between dispatches so consecutive beats overlap by the transition.
    /// Returns once every dispatched beat has finished.
    async fn play_concurrent(&self, specs: &[FrequencySpec]) -> Vec<BeatOutcome> {
        let mut group = BeatTaskGroup::new(self.cancel_token.child_token());
        let mut outcomes = Vec::with_capacity(specs.len());
        let interval = self.config.dispatch_interval();

        for (index, spec) in specs.iter().enumerate() {
            let outcome = self.dispatch(index, spec);

            if outcome.status != BeatStatus::Rejected {
                let job = self.job(&outcome);
                let token = group.token();
                group.spawn(index, run_beat(job, token));
            }
            outcomes.push(outcome);

            let is_last = index + 1 == specs.len();
            if !is_last && !interval.is_zero() && !self.pause(interval).await {
                break;
            }
        }

        for (index, status) in group.join_all().await {
            if let Some(outcome) = outcomes.iter_mut().find(|o| o.index == index) {
                outcome.status = status;
            }
        }
        outcomes
    }

    /// Play each beat to completion, pausing for the transition between entries.
    async fn play_sequential(&self, specs: &[FrequencySpec]) -> Vec<BeatOutcome> {
        let mut outcomes = Vec::with_capacity(specs.len());
        let transition = self.config.transition();

        for (index, spec) in specs.iter().enumerate() {
            let mut outcome = self.dispatch(index, spec);

            if outcome.status != BeatStatus::Rejected {
                outcome.status = run_beat(self.job(&outcome), self.cancel_token.child_token()).await;
            }
            outcomes.push(outcome);

            if self.cancel_token.is_cancelled() {
                break;
            }
            let is_last = index + 1 == specs.len();
            if !is_last && !transition.is_zero() && !self.pause(transition).await {
                break;
            }
        }
        outcomes
    }

    /// Derive ear frequencies, log the intent and validate. The returned
    /// outcome is `Rejected` when the pair is out of range, `Played` otherwise.
    fn dispatch(&self, index: usize, spec: &FrequencySpec) -> BeatOutcome {
        let (left_hz, right_hz) = spec.ear_frequencies(self.config.lower_octaves());

        match *spec {
            FrequencySpec::CenterBeat { center, beat } => log_info!(
                "Playing binaural beat: central frequency {} Hz, binaural frequency {} Hz",
                center,
                beat
            ),
            FrequencySpec::LeftRight { left, right } => log_info!(
                "Playing binaural beat: left frequency {} Hz, right frequency {} Hz",
                left,
                right
            ),
        }

        let status = match BeatSynthesizer::validate(left_hz, right_hz) {
            Ok(()) => BeatStatus::Played,
            Err(err) => {
                log_error!("Skipping beat {}: {}", index, err);
                BeatStatus::Rejected
            }
        };

        BeatOutcome {
            index,
            left_hz,
            right_hz,
            dispatched_at: Instant::now(),
            status,
        }
    }

    fn job(&self, outcome: &BeatOutcome) -> BeatJob {
        BeatJob {
            index: outcome.index,
            left_hz: outcome.left_hz,
            right_hz: outcome.right_hz,
            config: self.config,
            synth: self.synth,
            sink: Arc::clone(&self.sink),
        }
    }

    /// Sleep for `duration` unless the run is cancelled first. Returns false on cancel.
    async fn pause(&self, duration: std::time::Duration) -> bool {
        tokio::select! {
            _ = time::sleep(duration) => true,
            _ = self.cancel_token.cancelled() => false,
        }
    }
}

/// Render one beat off the async workers, hand it to the sink and wait for
/// the device to finish with it.
async fn run_beat(job: BeatJob, cancel_token: CancellationToken) -> BeatStatus {
    let BeatJob {
        index,
        left_hz,
        right_hz,
        config,
        synth,
        sink,
    } = job;

    let render = tokio::task::spawn_blocking(move || {
        synth.synthesize(
            left_hz,
            right_hz,
            config.play_time_secs(),
            config.transition_secs(),
            config.amplitude(),
        )
    });

    let buffer = tokio::select! {
        rendered = render => match rendered {
            Ok(Ok(buffer)) => buffer,
            Ok(Err(SynthError::OutOfRange(err))) => {
                log_error!("Skipping beat {}: {}", index, err);
                return BeatStatus::Rejected;
            }
            Ok(Err(err)) => {
                log_error!("beat {} could not be rendered: {err}", index);
                return BeatStatus::Failed;
            }
            Err(err) => {
                log_error!("beat {} render worker join failed: {err}", index);
                return BeatStatus::Failed;
            }
        },
        _ = cancel_token.cancelled() => return BeatStatus::Cancelled,
    };

    let playback = match sink.submit(buffer) {
        Ok(playback) => playback,
        Err(err) => {
            log_error!("beat {} could not be played: {err:?}", index);
            return BeatStatus::Failed;
        }
    };

    tokio::select! {
        finished = playback.finished() => match finished {
            Ok(()) => BeatStatus::Played,
            Err(err) => {
                log_warn!("beat {} playback ended early: {err}", index);
                BeatStatus::Failed
            }
        },
        _ = cancel_token.cancelled() => {
            sink.stop_all();
            BeatStatus::Cancelled
        }
    }
}

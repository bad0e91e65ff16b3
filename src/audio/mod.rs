pub mod binaural;
pub mod buffer;
pub mod output;

pub use binaural::{lower_octave, BeatSynthesizer, GainCurve, SynthSettings};
pub use buffer::{MonoBuffer, StereoBuffer};
pub use output::DeviceOutput;

use anyhow::{anyhow, Result};
use tokio::sync::oneshot;

/// Completion signal for one submitted buffer. Resolves once the sink has
/// finished (or abandoned) playing it.
pub struct Playback {
    done: oneshot::Receiver<Result<(), String>>,
}

impl Playback {
    pub fn channel() -> (oneshot::Sender<Result<(), String>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { done: rx })
    }

    pub async fn finished(self) -> Result<()> {
        match self.done.await {
            Ok(result) => result.map_err(|e| anyhow!(e)),
            Err(_) => Err(anyhow!("audio output dropped the playback before it finished")),
        }
    }
}

/// The single audio output shared by every beat of a run.
///
/// Implementations must accept overlapping submissions; mixing and device
/// ownership are their concern, not the caller's.
pub trait PlaybackSink: Send + Sync + 'static {
    fn submit(&self, buffer: StereoBuffer) -> Result<Playback>;

    /// Silence everything currently playing and resolve its playbacks.
    fn stop_all(&self);
}

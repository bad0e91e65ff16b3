use anyhow::{anyhow, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::sync::{
    mpsc::{self, RecvTimeoutError, Sender},
    Mutex,
};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use super::{Playback, PlaybackSink, StereoBuffer};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// How often the device thread checks whether playing sinks have drained.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

type Done = oneshot::Sender<Result<(), String>>;

enum OutputCommand {
    Play { buffer: StereoBuffer, done: Done },
    StopAll,
    Shutdown,
}

/// Default output device driven through rodio.
///
/// A dedicated thread owns the non-`Send` output stream. Every submitted
/// buffer gets its own `Sink` on that stream, so overlapping beats are mixed
/// by rodio while device access stays on one thread.
pub struct DeviceOutput {
    tx: Mutex<Option<Sender<OutputCommand>>>,
}

impl Default for DeviceOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceOutput {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<OutputCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio output lock poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<OutputCommand>();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut active: Vec<(Sink, Done)> = Vec::new();

                fn open_sink(
                    stream: &mut Option<(OutputStream, OutputStreamHandle)>,
                ) -> Result<Sink, String> {
                    if stream.is_none() {
                        let opened = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        *stream = Some(opened);
                    }
                    let (_, handle) = stream
                        .as_ref()
                        .ok_or_else(|| "audio output stream unavailable".to_string())?;
                    Sink::try_new(handle).map_err(|e| format!("Failed to create audio sink: {}", e))
                }

                loop {
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(OutputCommand::Play { buffer, done }) => match open_sink(&mut stream) {
                            Ok(sink) => {
                                sink.append(SamplesBuffer::new(2, buffer.sample_rate, buffer.samples));
                                active.push((sink, done));
                            }
                            Err(err) => {
                                log_error!("{}", err);
                                let _ = done.send(Err(err));
                            }
                        },
                        Ok(OutputCommand::StopAll) => {
                            for (sink, done) in active.drain(..) {
                                sink.stop();
                                let _ = done.send(Ok(()));
                            }
                        }
                        Ok(OutputCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }

                    let (drained, playing): (Vec<_>, Vec<_>) =
                        active.drain(..).partition(|(sink, _)| sink.empty());
                    active = playing;
                    for (_, done) in drained {
                        let _ = done.send(Ok(()));
                    }
                }

                for (sink, done) in active.drain(..) {
                    sink.stop();
                    let _ = done.send(Ok(()));
                }
                log_info!("audio output thread exiting");
            })?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, cmd: OutputCommand) -> Result<()> {
        let tx = self.ensure_thread()?;
        tx.send(cmd)
            .map_err(|_| anyhow!("audio output thread is not running"))
    }
}

impl PlaybackSink for DeviceOutput {
    fn submit(&self, buffer: StereoBuffer) -> Result<Playback> {
        let (done, playback) = Playback::channel();
        self.send(OutputCommand::Play { buffer, done })?;
        Ok(playback)
    }

    fn stop_all(&self) {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(OutputCommand::StopAll);
        }
    }
}

impl Drop for DeviceOutput {
    fn drop(&mut self) {
        let guard = match self.tx.get_mut() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(tx) = guard.take() {
            let _ = tx.send(OutputCommand::Shutdown);
        }
    }
}

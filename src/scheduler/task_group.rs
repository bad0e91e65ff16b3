use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::report::BeatStatus;

const ENABLE_LOGS: bool = true;

use crate::log_error;

/// Beat tasks spawned by one run, joined together as a single barrier.
///
/// Tasks receive a child of the group's token; dropping the group aborts
/// anything still outstanding so a run never leaves orphaned audio behind.
pub struct BeatTaskGroup {
    tasks: Vec<(usize, JoinHandle<BeatStatus>)>,
    cancel_token: CancellationToken,
}

impl BeatTaskGroup {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self {
            tasks: Vec::new(),
            cancel_token,
        }
    }

    /// Token handed to each spawned beat.
    pub fn token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn<F>(&mut self, index: usize, task: F)
    where
        F: Future<Output = BeatStatus> + Send + 'static,
    {
        self.tasks.push((index, tokio::spawn(task)));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Wait for every spawned beat. A task that panicked or was aborted is
    /// reported as failed; it does not stop the wait for the others.
    pub async fn join_all(mut self) -> Vec<(usize, BeatStatus)> {
        let mut results = Vec::with_capacity(self.tasks.len());
        for (index, handle) in self.tasks.drain(..) {
            let status = match handle.await {
                Ok(status) => status,
                Err(err) => {
                    log_error!("beat {} task failed to join: {err}", index);
                    BeatStatus::Failed
                }
            };
            results.push((index, status));
        }
        results
    }
}

impl Drop for BeatTaskGroup {
    fn drop(&mut self) {
        for (_, handle) in &self.tasks {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn join_all_waits_for_every_task() {
        let mut group = BeatTaskGroup::new(CancellationToken::new());
        for (index, secs) in [(0, 3), (1, 1), (2, 2)] {
            group.spawn(index, async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                BeatStatus::Played
            });
        }
        assert_eq!(group.len(), 3);

        let start = tokio::time::Instant::now();
        let results = group.join_all().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(
            results,
            vec![
                (0, BeatStatus::Played),
                (1, BeatStatus::Played),
                (2, BeatStatus::Played)
            ]
        );
    }

    #[tokio::test]
    async fn panicking_task_is_reported_as_failed() {
        let mut group = BeatTaskGroup::new(CancellationToken::new());
        group.spawn(0, async { panic!("render exploded") });
        group.spawn(1, async { BeatStatus::Played });

        let results = group.join_all().await;
        assert_eq!(results, vec![(0, BeatStatus::Failed), (1, BeatStatus::Played)]);
    }

    #[tokio::test]
    async fn cancel_reaches_child_tokens() {
        let group = BeatTaskGroup::new(CancellationToken::new());
        let child = group.token();
        group.cancel();
        assert!(child.is_cancelled());
    }
}

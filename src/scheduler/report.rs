use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

use crate::playlist::PlaybackMode;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BeatStatus {
    Played,
    /// Ear frequencies outside the audible range; nothing was rendered.
    Rejected,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatOutcome {
    pub index: usize,
    pub left_hz: f64,
    pub right_hz: f64,
    #[serde(skip)]
    pub dispatched_at: Instant,
    pub status: BeatStatus,
}

/// Summary of one completed run, in playlist order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: Uuid,
    pub scale: String,
    pub mode: PlaybackMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub beats: Vec<BeatOutcome>,
}

impl RunReport {
    pub fn count(&self, status: BeatStatus) -> usize {
        self.beats.iter().filter(|b| b.status == status).count()
    }

    pub fn played(&self) -> usize {
        self.count(BeatStatus::Played)
    }

    pub fn rejected(&self) -> usize {
        self.count(BeatStatus::Rejected)
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Where the ingestion loop currently is within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IngestPhase {
    Idle,
    Fetching,
    Decoding,
    Persisting,
}

/// Outcome of one successful tick.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TickReport {
    pub captured_at: DateTime<Utc>,
    pub fetched: usize,
    pub stored: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngestStatus {
    pub phase: IngestPhase,
    pub running: bool,
    pub ticks: u64,
    pub last_tick: Option<TickReport>,
    pub last_error: Option<String>,
}

impl Default for IngestStatus {
    fn default() -> Self {
        IngestStatus {
            phase: IngestPhase::Idle,
            running: false,
            ticks: 0,
            last_tick: None,
            last_error: None,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingestion loop already running")]
    AlreadyRunning,
}

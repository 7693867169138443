use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write failed for {aircraft_id}: {message}")]
    Write { aircraft_id: String, message: String },
    #[error("query failed: {0}")]
    Query(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn write(aircraft_id: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Write {
            aircraft_id: aircraft_id.to_string(),
            message: err.to_string(),
        }
    }

    pub fn query(err: impl std::fmt::Display) -> Self {
        StoreError::Query(err.to_string())
    }
}

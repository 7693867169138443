use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(u16),
    #[error("error decoding JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid snapshot timestamp: {0}")]
    Timestamp(i64),
}

/// A single field could not be decoded; the record itself is kept.
#[derive(Debug, Error, PartialEq)]
pub enum FieldDecodeError {
    #[error("unexpected value for alt_baro: {0}")]
    Altitude(String),
}

/// A feed entry that cannot become a stored row.
#[derive(Debug, Error, PartialEq)]
pub enum UnusableRecord {
    #[error("missing hex identity")]
    MissingIdentity,
    #[error("{0}: no distance and no position")]
    MissingDistance(String),
}

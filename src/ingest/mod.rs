mod error;
mod ingestor;
mod types;

pub use error::IngestError;
pub use ingestor::{IngestMonitor, Ingestor};
pub use types::{IngestPhase, IngestStatus, TickReport};

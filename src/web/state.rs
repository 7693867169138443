use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::ingest::IngestMonitor;
use crate::observation::{ObservationStore, StoreError};
use crate::status::StatusProjector;

use super::api::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObservationStore>,
    pub projector: StatusProjector,
    pub query_timeout: Duration,
    pub ingest: Option<IngestMonitor>,
}

impl AppState {
    /// Runs a read against the store on the blocking pool, bounded by the
    /// request timeout. A timed-out read is abandoned; reads have no side
    /// effects.
    pub async fn query<T, F>(&self, read: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ObservationStore, &StatusProjector, DateTime<Utc>) -> Result<T, StoreError>
            + Send
            + 'static,
    {
        let store = self.store.clone();
        let projector = self.projector;
        let now = Utc::now();
        let task = tokio::task::spawn_blocking(move || read(store.as_ref(), &projector, now));

        match tokio::time::timeout(self.query_timeout, task).await {
            Err(_) => Err(ApiError::Timeout),
            Ok(Err(e)) => Err(ApiError::Internal(e.to_string())),
            Ok(Ok(result)) => Ok(result?),
        }
    }
}

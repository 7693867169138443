use log::{debug, error, info, trace, warn};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::error::IngestError;
use super::types::{IngestPhase, IngestStatus, TickReport};
use crate::feed::{decode_snapshot, FeedError, FeedSource};
use crate::geo::ObserverPoint;
use crate::observation::{Observation, ObservationStore};

/// Read-only view of the loop's status, shared with the web layer.
#[derive(Clone, Default)]
pub struct IngestMonitor {
    shared: Arc<StdMutex<IngestStatus>>,
}

impl IngestMonitor {
    pub fn status(&self) -> IngestStatus {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(&mut IngestStatus)) {
        let mut locked = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut locked);
    }

    fn set_phase(&self, phase: IngestPhase) {
        trace!("Ingest phase: {}", phase);
        self.update(|s| s.phase = phase);
    }
}

struct Pipeline {
    feed: Arc<dyn FeedSource>,
    store: Arc<dyn ObservationStore>,
    observer: Option<ObserverPoint>,
    monitor: IngestMonitor,
}

impl Pipeline {
    async fn tick(&self) -> Result<TickReport, FeedError> {
        let result = self.run_stages().await;

        self.monitor.update(|s| {
            s.phase = IngestPhase::Idle;
            s.ticks += 1;
            match &result {
                Ok(report) => {
                    s.last_tick = Some(report.clone());
                    s.last_error = None;
                }
                Err(e) => s.last_error = Some(e.to_string()),
            }
        });

        result
    }

    async fn run_stages(&self) -> Result<TickReport, FeedError> {
        self.monitor.set_phase(IngestPhase::Fetching);
        let body = self.feed.fetch().await?;

        self.monitor.set_phase(IngestPhase::Decoding);
        let snapshot = decode_snapshot(&body)?;

        self.monitor.set_phase(IngestPhase::Persisting);
        let mut report = TickReport {
            captured_at: snapshot.captured_at,
            fetched: snapshot.aircraft.len(),
            stored: 0,
            failed: 0,
            skipped: 0,
        };

        let mut rows = Vec::with_capacity(report.fetched);
        for (i, aircraft) in snapshot.aircraft.into_iter().enumerate() {
            match aircraft.into_observation(snapshot.captured_at, self.observer.as_ref()) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping record {}: {}", i, e);
                    report.skipped += 1;
                }
            }
        }

        let attempted = rows.len();
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || persist(store.as_ref(), &rows)).await {
            Ok(stored) => {
                report.stored = stored;
                report.failed = attempted - stored;
            }
            Err(e) => {
                error!("Persisting batch failed: {}", e);
                report.failed = attempted;
            }
        }

        Ok(report)
    }
}

/// Appends each row, carrying on past failures. Returns how many were stored.
fn persist(store: &dyn ObservationStore, rows: &[Observation]) -> usize {
    let mut stored = 0;
    for row in rows {
        match store.append(row) {
            Ok(()) => stored += 1,
            Err(e) => error!("Error inserting record: {}", e),
        }
    }
    stored
}

struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Polls the feed on a fixed period and appends every snapshot to the store.
///
/// Ticks never overlap. A tick that runs longer than the period delays the
/// next one rather than queueing extra ticks. Failures only cost the tick
/// they happen in.
pub struct Ingestor {
    pipeline: Arc<Pipeline>,
    period: Duration,
    worker: Option<WorkerHandle>,
}

impl Ingestor {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        store: Arc<dyn ObservationStore>,
        observer: Option<ObserverPoint>,
        period: Duration,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                feed,
                store,
                observer,
                monitor: IngestMonitor::default(),
            }),
            period,
            worker: None,
        }
    }

    pub fn monitor(&self) -> IngestMonitor {
        self.pipeline.monitor.clone()
    }

    pub fn status(&self) -> IngestStatus {
        self.pipeline.monitor.status()
    }

    /// Runs a single fetch/decode/persist cycle.
    pub async fn tick(&self) -> Result<TickReport, FeedError> {
        self.pipeline.tick().await
    }

    pub fn start(&mut self) -> Result<(), IngestError> {
        if self.worker.is_some() {
            return Err(IngestError::AlreadyRunning);
        }

        let pipeline = self.pipeline.clone();
        let period = self.period;
        let (stop_tx, stop_rx) = oneshot::channel();

        pipeline.monitor.update(|s| s.running = true);
        let join = tokio::spawn(run_ingest_loop(pipeline, period, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });

        info!("Ingestion started, polling every {:?}", self.period);
        Ok(())
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if let Err(e) = worker.join.await {
                error!("Ingestion task ended abnormally: {}", e);
            }
        }
        self.pipeline.monitor.update(|s| {
            s.running = false;
            s.phase = IngestPhase::Idle;
        });
    }
}

async fn run_ingest_loop(
    pipeline: Arc<Pipeline>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            break;
        }

        match pipeline.tick().await {
            Ok(report) => debug!(
                "Stored {}/{} aircraft captured at {}",
                report.stored, report.fetched, report.captured_at
            ),
            Err(e) => error!("Error: {}", e),
        }
    }

    info!("Ingestion stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{MemoryStore, Observations, StoreError, WindowQuery};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NOW_MS: i64 = 1760529600000;

    struct CannedFeed {
        bodies: StdMutex<Vec<Result<Vec<u8>, FeedError>>>,
        calls: AtomicUsize,
    }

    impl CannedFeed {
        fn new(mut bodies: Vec<Result<Vec<u8>, FeedError>>) -> Self {
            bodies.reverse();
            Self {
                bodies: StdMutex::new(bodies),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedSource for CannedFeed {
        async fn fetch(&self) -> Result<Vec<u8>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FeedError::Status(503)))
        }
    }

    /// Rejects every row for one aircraft.
    struct PickyStore {
        inner: MemoryStore,
        reject: &'static str,
    }

    impl ObservationStore for PickyStore {
        fn append(&self, observation: &Observation) -> Result<(), StoreError> {
            if observation.aircraft_id == self.reject {
                return Err(StoreError::write(&observation.aircraft_id, "constraint violated"));
            }
            self.inner.append(observation)
        }

        fn query_window(&self, query: &WindowQuery) -> Result<Observations, StoreError> {
            self.inner.query_window(query)
        }
    }

    fn body(json: &str) -> Result<Vec<u8>, FeedError> {
        Ok(json.as_bytes().to_vec())
    }

    fn all_rows(store: &dyn ObservationStore) -> Vec<Observation> {
        let now = DateTime::from_timestamp_millis(NOW_MS).unwrap();
        store
            .query_window(&WindowQuery::new(now, ChronoDuration::hours(1)))
            .unwrap()
            .collect()
    }

    #[tokio::test]
    async fn tick_stores_batch_with_feed_time() {
        let feed = Arc::new(CannedFeed::new(vec![body(&format!(
            r#"{{"ac": [{{"hex": "a1", "dst": 3.2, "alt_baro": 900}}, {{"hex": "b2", "dst": 7.5, "alt_baro": "ground"}}], "now": {NOW_MS}}}"#
        ))]));
        let store = Arc::new(MemoryStore::new());
        let ingestor = Ingestor::new(feed, store.clone(), None, Duration::from_secs(2));

        let report = ingestor.tick().await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.stored, 2);
        assert_eq!(report.failed, 0);

        let rows = all_rows(store.as_ref());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|o| o.captured_at.timestamp_millis() == NOW_MS));

        let status = ingestor.status();
        assert_eq!(status.phase, IngestPhase::Idle);
        assert_eq!(status.ticks, 1);
        assert_eq!(status.last_tick, Some(report));
    }

    #[tokio::test]
    async fn failed_fetch_discards_tick() {
        let feed = Arc::new(CannedFeed::new(vec![Err(FeedError::Status(500))]));
        let store = Arc::new(MemoryStore::new());
        let ingestor = Ingestor::new(feed.clone(), store.clone(), None, Duration::from_secs(2));

        assert!(matches!(ingestor.tick().await, Err(FeedError::Status(500))));
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
        assert!(store.is_empty());
        assert_eq!(
            ingestor.status().last_error.as_deref(),
            Some("unexpected status code: 500")
        );
    }

    #[tokio::test]
    async fn malformed_body_discards_tick() {
        let feed = Arc::new(CannedFeed::new(vec![body(r#"{"ac": [{"hex": "a1", "dst": "far"}], "now": 1}"#)]));
        let store = Arc::new(MemoryStore::new());
        let ingestor = Ingestor::new(feed, store.clone(), None, Duration::from_secs(2));

        assert!(matches!(ingestor.tick().await, Err(FeedError::Decode(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn row_failure_does_not_block_batch() {
        let feed = Arc::new(CannedFeed::new(vec![body(&format!(
            r#"{{"ac": [{{"hex": "a1", "dst": 1.0}}, {{"hex": "bad", "dst": 2.0}}, {{"hex": "c3", "dst": 3.0}}, {{"dst": 4.0}}, {{"hex": "d4", "alt_baro": 9000}}], "now": {NOW_MS}}}"#
        ))]));
        let store = Arc::new(PickyStore {
            inner: MemoryStore::new(),
            reject: "bad",
        });
        let ingestor = Ingestor::new(feed, store.clone(), None, Duration::from_secs(2));

        let report = ingestor.tick().await.unwrap();
        assert_eq!(report.fetched, 5);
        assert_eq!(report.stored, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 2);

        let ids: Vec<_> = all_rows(store.as_ref())
            .into_iter()
            .map(|o| o.aircraft_id)
            .collect();
        assert_eq!(ids, vec!["a1", "c3"]);
    }

    #[tokio::test]
    async fn loop_keeps_polling_after_failures() {
        let good = format!(r#"{{"ac": [{{"hex": "a1", "dst": 1.0}}], "now": {NOW_MS}}}"#);
        let feed = Arc::new(CannedFeed::new(vec![
            Err(FeedError::Status(502)),
            body("not json"),
            body(&good),
        ]));
        let store = Arc::new(MemoryStore::new());
        let mut ingestor = Ingestor::new(feed.clone(), store.clone(), None, Duration::from_millis(10));

        ingestor.start().unwrap();
        assert!(matches!(ingestor.start(), Err(IngestError::AlreadyRunning)));

        for _ in 0..200 {
            if store.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        ingestor.stop().await;

        assert_eq!(store.len(), 1);
        assert!(feed.calls.load(Ordering::SeqCst) >= 3);
        let status = ingestor.status();
        assert!(!status.running);
        assert_eq!(status.phase, IngestPhase::Idle);
    }

    /// Fetches that outlast the period and record when each one started.
    struct SlowFeed {
        delays: StdMutex<Vec<Duration>>,
        starts: StdMutex<Vec<tokio::time::Instant>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for SlowFeed {
        async fn fetch(&self) -> Result<Vec<u8>, FeedError> {
            self.starts.lock().unwrap().push(tokio::time::Instant::now());
            let delay = self.delays.lock().unwrap().pop().unwrap_or_default();

            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Err(FeedError::Status(503))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tick_delays_the_next_one() {
        let period = Duration::from_millis(100);
        let feed = Arc::new(SlowFeed {
            delays: StdMutex::new(vec![Duration::from_millis(350)]),
            starts: StdMutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let mut ingestor = Ingestor::new(feed.clone(), Arc::new(MemoryStore::new()), None, period);

        ingestor.start().unwrap();
        tokio::time::sleep(Duration::from_millis(700)).await;
        ingestor.stop().await;

        assert_eq!(feed.max_in_flight.load(Ordering::SeqCst), 1);

        let starts = feed.starts.lock().unwrap().clone();
        // 0 ms (slow), then 350, 450, 550, 650: no catch-up burst at 350.
        assert!((4..=6).contains(&starts.len()), "got {} fetches", starts.len());
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= period, "ticks {:?} apart", pair[1] - pair[0]);
        }
    }
}

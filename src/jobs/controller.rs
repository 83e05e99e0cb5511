//! Job controller: starts, stops and reports on scrape jobs
//!
//! Each job runs as one tokio task that walks the symbol universe in order.
//! Per-symbol failures are counted and sampled into the job status; only a
//! universe load failure ends a job as FAILED.

use super::{ConnectionStore, JobRegistry, JobState, JobStatus, StopFlag, StopOutcome};
use crate::error::{AppError, Result};
use crate::scraper::{
    default_parser_for, provider_id, ConnectionConfig, ConnectionType, DocumentFetcher, FetchError,
    MetricParser, RecordNormalizer, RecordSink, ScrapeAdapter, SymbolDescriptor, UniverseReader,
    DEFAULT_URL_TEMPLATE,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const DEFAULT_MAX_JOB_ERRORS: usize = 10;
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Handle to a started job
pub struct JobHandle {
    pub job_id: String,
    /// Resolves to the terminal status once the job task ends
    pub completion: JoinHandle<JobStatus>,
}

/// Why a single symbol did not produce persisted records
#[derive(Debug, thiserror::Error)]
enum SymbolFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("PersistenceFailure: {0}")]
    Persistence(String),
}

impl SymbolFailure {
    fn summary(&self) -> String {
        match self {
            SymbolFailure::Fetch(e) => e.summary(),
            SymbolFailure::Persistence(_) => "PersistenceFailure".to_string(),
        }
    }
}

pub struct JobController {
    registry: Arc<JobRegistry>,
    connections: Arc<dyn ConnectionStore>,
    universe: UniverseReader,
    fetcher: Arc<dyn DocumentFetcher>,
    sink: Arc<dyn RecordSink>,
    parsers: HashMap<ConnectionType, Arc<dyn MetricParser>>,
    default_url_template: String,
    max_job_errors: usize,
}

impl JobController {
    pub fn new(
        registry: Arc<JobRegistry>,
        connections: Arc<dyn ConnectionStore>,
        universe: UniverseReader,
        fetcher: Arc<dyn DocumentFetcher>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let parsers = [ConnectionType::WebsiteScraping, ConnectionType::ApiConnection]
            .into_iter()
            .map(|t| (t, default_parser_for(t)))
            .collect();

        Self {
            registry,
            connections,
            universe,
            fetcher,
            sink,
            parsers,
            default_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            max_job_errors: DEFAULT_MAX_JOB_ERRORS,
        }
    }

    /// Override the parser used for a connection type
    pub fn with_parser(mut self, connection_type: ConnectionType, parser: Arc<dyn MetricParser>) -> Self {
        self.parsers.insert(connection_type, parser);
        self
    }

    pub fn with_default_url_template(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        if !template.trim().is_empty() {
            self.default_url_template = template;
        }
        self
    }

    pub fn with_max_job_errors(mut self, max_job_errors: usize) -> Self {
        self.max_job_errors = max_job_errors;
        self
    }

    /// Start a job for a connection and return immediately.
    ///
    /// Fails with `NotFound` before anything is registered when the
    /// connection does not exist.
    pub fn start(&self, connection_id: i64) -> Result<JobHandle> {
        let connection = self
            .connections
            .get_connection(connection_id)?
            .ok_or_else(|| AppError::NotFound(format!("Connection {} not found", connection_id)))?;

        let job_id = uuid::Uuid::new_v4().to_string();
        let stop = self
            .registry
            .register(JobStatus::new(&job_id, connection_id, self.max_job_errors));

        let parser = self
            .parsers
            .get(&connection.connection_type)
            .cloned()
            .unwrap_or_else(|| default_parser_for(connection.connection_type));
        let adapter = ScrapeAdapter::new(self.fetcher.clone(), parser, self.default_url_template.clone());
        let normalizer = RecordNormalizer::new(provider_id(
            adapter.effective_template(&connection.base_url_template),
        ));

        let job = ScrapeJob {
            job_id: job_id.clone(),
            connection,
            registry: self.registry.clone(),
            stop,
            universe: self.universe.clone(),
            adapter,
            normalizer,
            sink: self.sink.clone(),
            max_job_errors: self.max_job_errors,
        };

        info!("Starting scrape job {} for connection {}", job_id, connection_id);
        let completion = tokio::spawn(job.run());

        Ok(JobHandle { job_id, completion })
    }

    pub fn stop(&self, job_id: &str) -> Result<StopOutcome> {
        let outcome = self.registry.request_stop(job_id)?;
        match outcome {
            StopOutcome::Requested => info!("Stop requested for job {}", job_id),
            StopOutcome::AlreadyFinished(state) => {
                debug!("Stop ignored for job {} already {:?}", job_id, state)
            }
        }
        Ok(outcome)
    }

    pub fn get_status(&self, job_id: &str) -> Result<JobStatus> {
        self.registry
            .get(job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }

    pub fn list_jobs(&self) -> Vec<JobStatus> {
        self.registry.list()
    }

    /// Request a stop for every running job, then wait up to `grace` for
    /// them to reach a terminal state. Returns the number still running.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        let running: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .filter(|job| !job.is_terminal())
            .map(|job| job.job_id)
            .collect();

        for job_id in &running {
            if let Err(e) = self.stop(job_id) {
                warn!("Could not stop job {} at shutdown: {}", job_id, e);
            }
        }

        let deadline = tokio::time::Instant::now() + grace;
        loop {
            let still_running = running
                .iter()
                .filter(|id| self.registry.get(id).is_some_and(|s| !s.is_terminal()))
                .count();
            if still_running == 0 || tokio::time::Instant::now() >= deadline {
                return still_running;
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }
    }
}

/// State owned by one running job task
struct ScrapeJob {
    job_id: String,
    connection: ConnectionConfig,
    registry: Arc<JobRegistry>,
    stop: StopFlag,
    universe: UniverseReader,
    adapter: ScrapeAdapter,
    normalizer: RecordNormalizer,
    sink: Arc<dyn RecordSink>,
    max_job_errors: usize,
}

impl ScrapeJob {
    async fn run(self) -> JobStatus {
        let universe = match self.universe.load_universe().await {
            Ok(universe) => universe,
            Err(e) => {
                error!("Job {} failed to load universe: {}", self.job_id, e);
                return self.finish(JobState::Failed, Some(e.to_string()));
            }
        };

        let total = universe.len();
        self.registry.update(&self.job_id, |s| s.begin(total));
        info!(
            "Job {} scraping {} symbols from connection '{}'",
            self.job_id, total, self.connection.name
        );

        for symbol in &universe {
            if self.stop.is_requested() {
                info!("Job {} stopped before {}", self.job_id, symbol);
                return self.finish(JobState::Stopped, Some("Stopped by request".to_string()));
            }

            match self.process_symbol(symbol).await {
                Ok(inserted) => {
                    debug!("{} -> {} records", symbol, inserted);
                    self.registry
                        .update(&self.job_id, |s| s.record_success(inserted));
                }
                Err(failure) => {
                    warn!("Job {}: {} failed: {}", self.job_id, symbol, failure);
                    let summary = failure.summary();
                    self.registry.update(&self.job_id, |s| {
                        s.record_failure(&symbol.trading_symbol, summary)
                    });
                }
            }
        }

        // A stop that landed during the final symbol still wins
        if self.stop.is_requested() {
            info!("Job {} stopped after its final symbol", self.job_id);
            return self.finish(JobState::Stopped, Some("Stopped by request".to_string()));
        }

        self.finish(JobState::Completed, None)
    }

    async fn process_symbol(&self, symbol: &SymbolDescriptor) -> std::result::Result<usize, SymbolFailure> {
        let metrics = self
            .adapter
            .fetch_and_parse(symbol, &self.connection.base_url_template)
            .await?;

        let metadata = serde_json::json!({
            "job_id": self.job_id,
            "connection_id": self.connection.id,
        })
        .to_string();

        let mut records = self
            .normalizer
            .normalize(&symbol.trading_symbol, &symbol.exchange, &metrics);
        for record in &mut records {
            record.metadata = Some(metadata.clone());
        }

        if records.is_empty() {
            return Ok(0);
        }

        let sink = self.sink.clone();
        tokio::task::spawn_blocking(move || sink.append(&records))
            .await
            .map_err(|e| SymbolFailure::Persistence(e.to_string()))?
            .map_err(|e| SymbolFailure::Persistence(e.to_string()))
    }

    fn finish(&self, state: JobState, message: Option<String>) -> JobStatus {
        let status = self.registry.update(&self.job_id, |s| {
            s.finish(state, message.clone());
        });

        let status = status.unwrap_or_else(|| {
            let mut orphan = JobStatus::new(&self.job_id, self.connection.id, self.max_job_errors);
            orphan.finish(state, message);
            orphan
        });

        info!(
            "Job {} finished {:?}: {}/{} processed, {} ok, {} failed, {} records",
            self.job_id,
            status.status,
            status.symbols_processed,
            status.total_symbols,
            status.symbols_succeeded,
            status.symbols_failed,
            status.total_records_inserted
        );
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::duckdb::DuckDb;
    use crate::db::sqlite::models::SymbolRow;
    use crate::db::sqlite::SqliteDb;
    use crate::scraper::{FetchErrorKind, ScrapeRecord, SymbolStore};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::{mpsc, Semaphore};

    const PAGE_WITHOUT_FACE_VALUE: &str = r#"
        <ul id="top-ratios">
          <li><span class="name">Market Cap</span> ₹ <span>19,19,876</span> Cr.</li>
          <li><span class="name">Current Price</span> ₹ <span>1,419</span></li>
          <li><span class="name">High / Low</span> ₹ <span>1,609</span> / <span>1,115</span></li>
          <li><span class="name">Stock P/E</span> <span>27.3</span></li>
          <li><span class="name">Book Value</span> ₹ <span>648</span></li>
          <li><span class="name">Dividend Yield</span> <span>0.39</span> %</li>
          <li><span class="name">ROCE</span> <span>9.69</span> %</li>
          <li><span class="name">ROE</span> <span>8.40</span> %</li>
        </ul>
    "#;

    /// Responds per URL substring; unknown URLs get a network error
    struct ScriptedFetcher {
        responses: Vec<(&'static str, std::result::Result<String, FetchError>)>,
    }

    #[async_trait]
    impl DocumentFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            self.responses
                .iter()
                .find(|(key, _)| url.contains(key))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(FetchError::network("connection refused")))
        }
    }

    /// Announces every fetch and blocks until the test releases a permit
    struct GatedFetcher {
        started: mpsc::UnboundedSender<String>,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl DocumentFetcher for GatedFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            let _ = self.started.send(url.to_string());
            let permit = self.gate.acquire().await.map_err(|e| FetchError::network(e.to_string()))?;
            permit.forget();
            Ok("Stock P/E 12.0".to_string())
        }
    }

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn append(&self, _records: &[ScrapeRecord]) -> Result<usize> {
            Err(AppError::Internal("disk full".to_string()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<ScrapeRecord>>,
    }

    impl RecordSink for MemorySink {
        fn append(&self, records: &[ScrapeRecord]) -> Result<usize> {
            self.records.lock().extend_from_slice(records);
            Ok(records.len())
        }
    }

    struct BrokenStore;

    impl SymbolStore for BrokenStore {
        fn load_universe(&self) -> Result<Vec<crate::scraper::SymbolDescriptor>> {
            Err(AppError::Internal("no such table: symtoken".to_string()))
        }
    }

    fn eq_row(symbol: &str) -> SymbolRow {
        SymbolRow {
            symbol: symbol.to_string(),
            token: format!("{}-EQ", symbol),
            exchange: "NSE".to_string(),
            name: symbol.to_string(),
            instrument_type: "EQ".to_string(),
            status: "ACTIVE".to_string(),
        }
    }

    /// SQLite with the given NSE equities and one website connection (id 1)
    fn sqlite_with(symbols: &[&str]) -> Arc<SqliteDb> {
        let db = SqliteDb::in_memory().unwrap();
        let rows: Vec<SymbolRow> = symbols.iter().map(|s| eq_row(s)).collect();
        db.store_symbols(&rows).unwrap();
        db.insert_connection(
            "screener",
            "https://www.screener.in/company/{symbol}/consolidated/",
            ConnectionType::WebsiteScraping,
        )
        .unwrap();
        Arc::new(db)
    }

    fn controller(
        db: Arc<SqliteDb>,
        fetcher: Arc<dyn DocumentFetcher>,
        sink: Arc<dyn RecordSink>,
    ) -> JobController {
        JobController::new(
            Arc::new(JobRegistry::new()),
            db.clone(),
            UniverseReader::with_backoff(db, 3, Duration::from_millis(1)),
            fetcher,
            sink,
        )
    }

    fn assert_counters(status: &JobStatus) {
        assert!(status.symbols_processed <= status.total_symbols);
        assert_eq!(
            status.symbols_succeeded + status.symbols_failed,
            status.symbols_processed
        );
    }

    #[tokio::test]
    async fn test_end_to_end_success_and_timeout() {
        let db = sqlite_with(&["RELIANCE", "TCS"]);
        let fetcher = Arc::new(ScriptedFetcher {
            responses: vec![
                ("/RELIANCE/", Ok(PAGE_WITHOUT_FACE_VALUE.to_string())),
                ("/TCS/", Err(FetchError::timeout("no response within 15s"))),
            ],
        });
        let duck = Arc::new(DuckDb::in_memory().unwrap());
        let controller = controller(db, fetcher, duck.clone());

        let handle = controller.start(1).unwrap();
        let status = handle.completion.await.unwrap();

        assert_eq!(status.status, JobState::Completed);
        assert_eq!(status.total_symbols, 2);
        assert_eq!(status.symbols_processed, 2);
        assert_eq!(status.symbols_succeeded, 1);
        assert_eq!(status.symbols_failed, 1);
        assert_eq!(status.total_records_inserted, 9);
        assert_eq!(status.percentage, 100.0);
        assert_eq!(status.errors.len(), 1);
        assert_eq!(status.errors[0].symbol, "TCS");
        assert_eq!(status.errors[0].message, "Timeout");

        let stored = duck.query_records("RELIANCE", "NSE").unwrap();
        assert_eq!(stored.len(), 9);
        assert!(stored.iter().all(|r| r.source == "screener.in"));
        let metadata: serde_json::Value =
            serde_json::from_str(stored[0].metadata.as_deref().unwrap()).unwrap();
        assert_eq!(metadata["job_id"], handle.job_id.as_str());
        assert_eq!(metadata["connection_id"], 1);

        // Registry holds the same terminal snapshot
        let polled = controller.get_status(&handle.job_id).unwrap();
        assert_eq!(polled.status, JobState::Completed);
        assert_eq!(polled.total_records_inserted, 9);
    }

    #[tokio::test]
    async fn test_stop_before_second_symbol() {
        let db = sqlite_with(&["A", "B", "C"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(GatedFetcher {
            started: tx,
            gate: gate.clone(),
        });
        let controller = controller(db, fetcher, Arc::new(MemorySink::default()));

        let handle = controller.start(1).unwrap();

        // First symbol is in flight
        let first_url = rx.recv().await.unwrap();
        assert!(first_url.contains("/A/"));
        assert_eq!(controller.stop(&handle.job_id).unwrap(), StopOutcome::Requested);
        assert_eq!(controller.stop(&handle.job_id).unwrap(), StopOutcome::Requested);
        gate.add_permits(3);

        let status = handle.completion.await.unwrap();
        assert_eq!(status.status, JobState::Stopped);
        assert_eq!(status.symbols_processed, 1);
        assert_eq!(status.symbols_succeeded, 1);
        assert_counters(&status);

        // Stop after a terminal state changes nothing
        assert_eq!(
            controller.stop(&handle.job_id).unwrap(),
            StopOutcome::AlreadyFinished(JobState::Stopped)
        );
        assert_eq!(
            controller.get_status(&handle.job_id).unwrap().status,
            JobState::Stopped
        );
    }

    #[tokio::test]
    async fn test_stop_during_final_symbol() {
        let db = sqlite_with(&["ONLY"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(GatedFetcher {
            started: tx,
            gate: gate.clone(),
        });
        let controller = controller(db, fetcher, Arc::new(MemorySink::default()));
        let handle = controller.start(1).unwrap();

        rx.recv().await.unwrap();
        assert_eq!(controller.stop(&handle.job_id).unwrap(), StopOutcome::Requested);
        gate.add_permits(1);

        let status = handle.completion.await.unwrap();
        assert_eq!(status.status, JobState::Stopped);
        assert_eq!(status.symbols_processed, 1);
        assert_counters(&status);
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_jobs() {
        let db = sqlite_with(&["A", "B", "C"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(GatedFetcher {
            started: tx,
            gate: gate.clone(),
        });
        let controller = controller(db, fetcher, Arc::new(MemorySink::default()));
        let handle = controller.start(1).unwrap();
        rx.recv().await.unwrap();

        let releaser = {
            let gate = gate.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                gate.add_permits(3);
            })
        };

        let still_running = controller.shutdown(Duration::from_secs(5)).await;
        releaser.await.unwrap();

        assert_eq!(still_running, 0);
        let status = controller.get_status(&handle.job_id).unwrap();
        assert_eq!(status.status, JobState::Stopped);
        assert_eq!(status.symbols_processed, 1);
    }

    #[tokio::test]
    async fn test_status_invariants_while_running() {
        let db = sqlite_with(&["A", "B", "C", "D"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let fetcher = Arc::new(GatedFetcher {
            started: tx,
            gate: gate.clone(),
        });
        let controller = controller(db, fetcher, Arc::new(MemorySink::default()));
        let handle = controller.start(1).unwrap();

        let mut last_processed = 0;
        for _ in 0..4 {
            rx.recv().await.unwrap();
            let status = controller.get_status(&handle.job_id).unwrap();
            assert_eq!(status.status, JobState::Processing);
            assert_eq!(status.total_symbols, 4);
            assert!(status.symbols_processed >= last_processed);
            assert_counters(&status);
            last_processed = status.symbols_processed;
            gate.add_permits(1);
        }

        let status = handle.completion.await.unwrap();
        assert_eq!(status.status, JobState::Completed);
        assert_eq!(status.symbols_processed, 4);
        assert_counters(&status);
    }

    #[tokio::test]
    async fn test_universe_failure_marks_job_failed() {
        let db = sqlite_with(&[]);
        let controller = JobController::new(
            Arc::new(JobRegistry::new()),
            db,
            UniverseReader::with_backoff(Arc::new(BrokenStore), 3, Duration::from_millis(1)),
            Arc::new(ScriptedFetcher { responses: vec![] }),
            Arc::new(MemorySink::default()),
        );

        let status = controller.start(1).unwrap().completion.await.unwrap();
        assert_eq!(status.status, JobState::Failed);
        assert_eq!(status.total_symbols, 0);
        assert_eq!(status.symbols_processed, 0);
        assert!(status.message.unwrap().contains("no such table"));
    }

    #[tokio::test]
    async fn test_empty_universe_completes() {
        let db = sqlite_with(&[]);
        let controller = controller(
            db,
            Arc::new(ScriptedFetcher { responses: vec![] }),
            Arc::new(MemorySink::default()),
        );

        let status = controller.start(1).unwrap().completion.await.unwrap();
        assert_eq!(status.status, JobState::Completed);
        assert_eq!(status.total_symbols, 0);
        assert_eq!(status.percentage, 100.0);
    }

    #[tokio::test]
    async fn test_unknown_connection_registers_nothing() {
        let db = sqlite_with(&["TCS"]);
        let controller = controller(
            db,
            Arc::new(ScriptedFetcher { responses: vec![] }),
            Arc::new(MemorySink::default()),
        );

        let err = controller.start(42).err().unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(controller.list_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_per_symbol() {
        let db = sqlite_with(&["INFY", "TCS"]);
        let fetcher = Arc::new(ScriptedFetcher {
            responses: vec![("/", Ok("ROE 12.5 %".to_string()))],
        });
        let controller = controller(db, fetcher, Arc::new(FailingSink));

        let status = controller.start(1).unwrap().completion.await.unwrap();
        assert_eq!(status.status, JobState::Completed);
        assert_eq!(status.symbols_failed, 2);
        assert_eq!(status.total_records_inserted, 0);
        assert!(status.errors.iter().all(|e| e.message == "PersistenceFailure"));
    }

    #[tokio::test]
    async fn test_fetch_error_kinds_are_summarised() {
        let db = sqlite_with(&["BLOCKED", "GONE", "DOWN"]);
        let fetcher = Arc::new(ScriptedFetcher {
            responses: vec![
                ("/BLOCKED/", Ok("<html>Access Denied</html>".to_string())),
                ("/GONE/", Err(FetchError::http_status(404))),
            ],
        });
        let controller = controller(db, fetcher, Arc::new(MemorySink::default()));

        let status = controller.start(1).unwrap().completion.await.unwrap();
        let messages: Vec<&str> = status.errors.iter().map(|e| e.message.as_str()).collect();
        // Universe order is (exchange, symbol)
        assert_eq!(messages, vec!["ParseFailure", "Network", "HttpStatus 404"]);
        assert_eq!(status.symbols_failed, 3);
        assert_eq!(
            FetchError::parse_failure("x").kind,
            FetchErrorKind::ParseFailure
        );
    }

    #[tokio::test]
    async fn test_error_list_is_capped() {
        let symbols: Vec<String> = (0..5).map(|i| format!("S{}", i)).collect();
        let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
        let db = sqlite_with(&refs);
        let controller = controller(
            db,
            Arc::new(ScriptedFetcher { responses: vec![] }),
            Arc::new(MemorySink::default()),
        )
        .with_max_job_errors(2);

        let status = controller.start(1).unwrap().completion.await.unwrap();
        assert_eq!(status.symbols_failed, 5);
        let kept: Vec<&str> = status.errors.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(kept, vec!["S3", "S4"]);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_are_independent() {
        let db = sqlite_with(&["RELIANCE", "TCS"]);
        let fetcher = Arc::new(ScriptedFetcher {
            responses: vec![("/", Ok(PAGE_WITHOUT_FACE_VALUE.to_string()))],
        });
        let sink = Arc::new(MemorySink::default());
        let controller = controller(db, fetcher, sink.clone());

        let first = controller.start(1).unwrap();
        let second = controller.start(1).unwrap();
        assert_ne!(first.job_id, second.job_id);

        let a = first.completion.await.unwrap();
        let b = second.completion.await.unwrap();
        assert_eq!(a.total_records_inserted, 18);
        assert_eq!(b.total_records_inserted, 18);
        assert_eq!(sink.records.lock().len(), 36);
        assert_eq!(controller.list_jobs().len(), 2);
    }

    #[tokio::test]
    async fn test_json_parser_for_api_connections() {
        let db = sqlite_with(&["TCS"]);
        db.insert_connection("quotes-api", "https://api.quotes.test/v1/{symbol}/", ConnectionType::ApiConnection)
            .unwrap();
        let fetcher = Arc::new(ScriptedFetcher {
            responses: vec![(
                "api.quotes.test",
                Ok(r#"{"data": {"Current Price": 3510.5, "roe": "48.1%"}}"#.to_string()),
            )],
        });
        let sink = Arc::new(MemorySink::default());
        let controller = controller(db, fetcher, sink.clone());

        let status = controller.start(2).unwrap().completion.await.unwrap();
        assert_eq!(status.total_records_inserted, 2);
        let records = sink.records.lock();
        assert!(records.iter().all(|r| r.source == "api.quotes.test"));
    }
}

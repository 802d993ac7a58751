// Standard library
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// 3rd party crates
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tracing::{debug, info};

// Current module imports
use super::constants::FIXTURE_ADAPTER;
use super::errors::DirectoryError;
use super::traits::{DirectoryConnector, GeoDirectory};
use super::types::{ConnectionParams, DirectoryResponse, IpInfo, IpInfoField, ReturnCode};

/// Counters and scripted failures shared by a connector and every session it opens.
#[derive(Debug, Default)]
struct FixtureState {
    query_failure: ArcSwapOption<DirectoryError>,
    connect_failure: ArcSwapOption<DirectoryError>,
    queries: AtomicUsize,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

/// In-memory directory keyed by address, for diagnostics and tests.
///
/// Clones share counters and scripted failures, so a test can keep one handle
/// while the connection manager owns the sessions.
#[derive(Debug, Clone, Default)]
pub struct FixtureConnector {
    records: HashMap<String, IpInfo>,
    state: Arc<FixtureState>,
}

#[derive(Debug)]
pub struct FixtureDirectory {
    records: Arc<HashMap<String, IpInfo>>,
    state: Arc<FixtureState>,
    closed: AtomicBool,
}

impl FixtureConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, keyed by its `ip_address` field.
    pub fn with_record(mut self, record: IpInfo) -> Self {
        let address = record
            .get_string(IpInfoField::IpAddress)
            .unwrap_or_default()
            .to_string();
        self.records.insert(address, record);
        self
    }

    /// Loads records from a JSON object mapping addresses to records.
    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryError> {
        let file = File::open(path).map_err(|e| {
            DirectoryError::Connect(format!("cannot open fixture {}: {}", path.display(), e))
        })?;
        let records: HashMap<String, IpInfo> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                DirectoryError::Connect(format!("invalid fixture {}: {}", path.display(), e))
            })?;

        info!("Loaded {} fixture records from {:?}", records.len(), path);

        Ok(Self {
            records,
            state: Arc::default(),
        })
    }

    /// Makes every query fail with `error` until cleared with `None`.
    pub fn fail_queries_with(&self, error: Option<DirectoryError>) {
        self.state.query_failure.store(error.map(Arc::new));
    }

    /// Makes every connect attempt fail with `error` until cleared with `None`.
    pub fn fail_connects_with(&self, error: Option<DirectoryError>) {
        self.state.connect_failure.store(error.map(Arc::new));
    }

    pub fn query_count(&self) -> usize {
        self.state.queries.load(Ordering::SeqCst)
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoDirectory for FixtureDirectory {
    async fn get_ip_info(&self, address: &str) -> Result<DirectoryResponse, DirectoryError> {
        self.state.queries.fetch_add(1, Ordering::SeqCst);

        if self.closed.load(Ordering::Acquire) {
            return Err(DirectoryError::provider(
                ReturnCode::ServerUnavailable,
                "fixture session is closed",
            ));
        }

        if let Some(error) = self.state.query_failure.load_full() {
            return Err((*error).clone());
        }

        if address.parse::<IpAddr>().is_err() {
            return Err(DirectoryError::provider(
                ReturnCode::InvalidInput,
                format!("'{}' is not an IP address", address),
            ));
        }

        let record = self
            .records
            .get(address)
            .cloned()
            .unwrap_or_else(|| IpInfo::not_found(address));

        debug!(address = %address, code = %record.ret_code, "Fixture lookup");

        Ok(DirectoryResponse {
            records: vec![record],
        })
    }

    async fn close(&self) -> Result<(), DirectoryError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        FIXTURE_ADAPTER
    }
}

#[async_trait]
impl DirectoryConnector for FixtureConnector {
    async fn connect(
        &self,
        _params: &ConnectionParams,
    ) -> Result<Box<dyn GeoDirectory>, DirectoryError> {
        if let Some(error) = self.state.connect_failure.load_full() {
            return Err((*error).clone());
        }

        self.state.connects.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FixtureDirectory {
            records: Arc::new(self.records.clone()),
            state: Arc::clone(&self.state),
            closed: AtomicBool::new(false),
        }))
    }

    fn name(&self) -> &str {
        FIXTURE_ADAPTER
    }
}

// Standard library
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// 3rd party crates
use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

// Project imports
use crate::directory::errors::DirectoryError;
use crate::directory::traits::{DirectoryConnector, GeoDirectory};
use crate::directory::types::{ConnectionParams, DirectoryResponse};

// Current module imports
use super::types::{ApplyOutcome, GeoQueryConfig};

/// An open directory session owned by the `ConnectionManager`.
pub struct Connection {
    id: u64,
    params: ConnectionParams,
    directory: Box<dyn GeoDirectory>,
    closed: AtomicBool,
}

impl Connection {
    fn new(id: u64, params: ConnectionParams, directory: Box<dyn GeoDirectory>) -> Self {
        Self {
            id,
            params,
            directory,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) async fn get_ip_info(&self, address: &str) -> Result<DirectoryResponse, DirectoryError> {
        self.directory.get_ip_info(address).await
    }

    /// Closes the session. Only the first call reaches the directory; failures are logged.
    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.directory.close().await {
            Ok(()) => info!(connection = self.id, "Closed directory connection"),
            Err(e) => error!(
                connection = self.id,
                "Failed to close directory connection: {}",
                e
            ),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("directory", &self.directory.name())
            .field("primary", &self.params.primary)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Holds the single live directory connection and rebuilds it on configuration changes.
///
/// Readers load the current connection without locking. Reloads are
/// serialized, and a superseded connection is closed only after its
/// replacement has been published.
pub struct ConnectionManager {
    connector: Arc<dyn DirectoryConnector>,
    current: ArcSwapOption<Connection>,
    reload: Mutex<()>,
    next_id: AtomicU64,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn DirectoryConnector>) -> Self {
        Self {
            connector,
            current: ArcSwapOption::empty(),
            reload: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Opens a connection for `config` and swaps it in.
    ///
    /// Incomplete settings and connect failures are logged and leave the
    /// current connection, if any, in place.
    pub async fn apply_config(&self, config: &GeoQueryConfig) -> ApplyOutcome {
        self.apply_config_with(config, || {}).await
    }

    /// Like `apply_config`, running `publish` first under the same reload lock.
    ///
    /// `publish` runs whether or not the settings are accepted, so state
    /// published with it always pairs with the reload that produced it.
    pub(crate) async fn apply_config_with<F>(&self, config: &GeoQueryConfig, publish: F) -> ApplyOutcome
    where
        F: FnOnce(),
    {
        let _reload = self.reload.lock().await;
        publish();

        let params = match ConnectionParams::try_from(config) {
            Ok(params) => params,
            Err(e) => {
                error!("Directory settings rejected, connection will not be made: {}", e);
                return ApplyOutcome::Rejected(e);
            }
        };

        let directory = match self.connector.connect(&params).await {
            Ok(directory) => directory,
            Err(e) => {
                error!(
                    connector = %self.connector.name(),
                    server = %params.primary,
                    "Directory connection failed, keeping the previous one: {}",
                    e
                );
                return ApplyOutcome::ConnectFailed(e);
            }
        };

        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let connection = Arc::new(Connection::new(connection_id, params, directory));
        info!(
            connection = connection_id,
            connector = %self.connector.name(),
            server = %connection.params.primary,
            "Opened directory connection"
        );

        if let Some(previous) = self.current.swap(Some(connection)) {
            previous.close().await;
        }

        ApplyOutcome::Connected { connection_id }
    }

    pub fn current_connection(&self) -> Option<Arc<Connection>> {
        self.current.load_full()
    }

    /// Drops `connection` if it is still the current one, then closes it.
    ///
    /// Returns `false` when a reload already replaced it.
    pub async fn invalidate(&self, connection: &Arc<Connection>) -> bool {
        let expected = Some(Arc::clone(connection));
        let previous = self.current.compare_and_swap(&expected, None::<Arc<Connection>>);
        let swapped = matches!(&*previous, Some(current) if Arc::ptr_eq(current, connection));
        drop(previous);

        if swapped {
            warn!(
                connection = connection.id,
                "Directory connection invalidated, lookups will fail until the next reload"
            );
            connection.close().await;
        }
        swapped
    }

    /// Closes the current connection, if any.
    pub async fn shutdown(&self) {
        let _reload = self.reload.lock().await;
        if let Some(connection) = self.current.swap(None) {
            connection.close().await;
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connector", &self.connector.name())
            .field("current", &self.current.load_full().map(|c| c.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixture::FixtureConnector;
    use crate::directory::types::ReturnCode;

    fn config() -> GeoQueryConfig {
        GeoQueryConfig {
            connection_pool_size: Some("4".into()),
            client_timeout_ms: Some("500".into()),
            primary_server_ip: Some("10.0.0.5".into()),
            primary_server_port: Some("7000".into()),
            ..GeoQueryConfig::default()
        }
    }

    #[tokio::test]
    async fn starts_without_a_connection() {
        let manager = ConnectionManager::new(Arc::new(FixtureConnector::new()));
        assert!(manager.current_connection().is_none());
    }

    #[tokio::test]
    async fn reload_replaces_then_closes_the_previous_connection() {
        let fixture = FixtureConnector::new();
        let manager = ConnectionManager::new(Arc::new(fixture.clone()));

        assert!(manager.apply_config(&config()).await.is_connected());
        let first = manager.current_connection().unwrap();

        assert!(manager.apply_config(&config()).await.is_connected());
        let second = manager.current_connection().unwrap();

        assert_ne!(first.id(), second.id());
        assert!(first.is_closed());
        assert!(!second.is_closed());
        assert_eq!(fixture.connect_count(), 2);
        assert_eq!(fixture.close_count(), 1);
    }

    #[tokio::test]
    async fn incomplete_settings_keep_the_current_connection() {
        let fixture = FixtureConnector::new();
        let manager = ConnectionManager::new(Arc::new(fixture.clone()));
        manager.apply_config(&config()).await;
        let before = manager.current_connection().unwrap();

        let incomplete = GeoQueryConfig {
            primary_server_port: None,
            ..config()
        };
        let outcome = manager.apply_config(&incomplete).await;

        assert!(matches!(outcome, ApplyOutcome::Rejected(_)));
        assert_eq!(manager.current_connection().unwrap().id(), before.id());
        assert!(!before.is_closed());
        assert_eq!(fixture.connect_count(), 1);
    }

    #[tokio::test]
    async fn connect_failure_keeps_the_current_connection() {
        let fixture = FixtureConnector::new();
        let manager = ConnectionManager::new(Arc::new(fixture.clone()));
        manager.apply_config(&config()).await;
        let before = manager.current_connection().unwrap();

        fixture.fail_connects_with(Some(DirectoryError::Connect("license expired".into())));
        let outcome = manager.apply_config(&config()).await;

        assert!(matches!(outcome, ApplyOutcome::ConnectFailed(_)));
        assert_eq!(manager.current_connection().unwrap().id(), before.id());
        assert!(!before.is_closed());
    }

    #[tokio::test]
    async fn invalidate_only_drops_the_matching_connection() {
        let fixture = FixtureConnector::new();
        let manager = ConnectionManager::new(Arc::new(fixture.clone()));
        manager.apply_config(&config()).await;
        let stale = manager.current_connection().unwrap();
        manager.apply_config(&config()).await;

        assert!(!manager.invalidate(&stale).await);
        assert!(manager.current_connection().is_some());

        let live = manager.current_connection().unwrap();
        assert!(manager.invalidate(&live).await);
        assert!(manager.current_connection().is_none());
        assert!(live.is_closed());
        assert_eq!(fixture.close_count(), 2);
    }

    #[tokio::test]
    async fn closed_connection_refuses_queries() {
        let manager = ConnectionManager::new(Arc::new(FixtureConnector::new()));
        manager.apply_config(&config()).await;
        let connection = manager.current_connection().unwrap();

        manager.shutdown().await;

        assert!(manager.current_connection().is_none());
        assert!(matches!(
            connection.get_ip_info("68.184.77.220").await,
            Err(DirectoryError::Provider {
                code: ReturnCode::ServerUnavailable,
                ..
            })
        ));
    }
}

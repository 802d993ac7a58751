// Standard library
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

// 3rd party crates
use arc_swap::ArcSwap;
use tracing::{debug, error, warn};

// Project imports
use crate::directory::errors::DirectoryError;

// Current module imports
use super::connection::{Connection, ConnectionManager};
use super::errors::LookupError;
use super::functions::{classify_return_code, is_usable_record, map_record};
use super::types::{ApplyOutcome, ErrorClass, GeoLookupResult, GeoQueryConfig, LookupPolicy};

/// Resolves addresses through the connection held by a `ConnectionManager`.
///
/// Lookups share the current connection without locking. A failure that
/// breaks the link invalidates the connection, so later lookups fail fast
/// with `SERVER_NOT_AVAILABLE` until the configuration is applied again.
#[derive(Debug)]
pub struct LookupAdapter {
    connections: ConnectionManager,
    policy: ArcSwap<LookupPolicy>,
}

impl LookupAdapter {
    pub fn new(connections: ConnectionManager) -> Self {
        Self {
            connections,
            policy: ArcSwap::from_pointee(LookupPolicy::default()),
        }
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Re-reads the flat directory properties and rebuilds the connection.
    pub async fn configuration_changed(&self, properties: &HashMap<String, String>) -> ApplyOutcome {
        debug!("Applying directory configuration");
        let config = GeoQueryConfig::from_properties(properties);
        self.apply_config(&config).await
    }

    /// Publishes the lookup policy of `config`, then hands it to the connection manager.
    pub async fn apply_config(&self, config: &GeoQueryConfig) -> ApplyOutcome {
        let policy = LookupPolicy::from(config);
        if let Some(address) = &policy.ip_address_override {
            warn!(
                address = %address,
                "Address override is set, every lookup will query it instead"
            );
        }
        self.connections
            .apply_config_with(config, || self.policy.store(Arc::new(policy)))
            .await
    }

    /// Looks up `ip_address`, honouring the configured address override.
    pub async fn lookup(&self, ip_address: &str) -> Result<GeoLookupResult, LookupError> {
        let policy = self.policy.load_full();
        self.lookup_with(ip_address, policy.ip_address_override.as_deref(), &policy)
            .await
    }

    /// Looks up `ip_address`, or `override_address` instead when it is set and non-blank.
    pub async fn lookup_with_override(
        &self,
        ip_address: &str,
        override_address: Option<&str>,
    ) -> Result<GeoLookupResult, LookupError> {
        let policy = self.policy.load_full();
        self.lookup_with(ip_address, override_address, &policy).await
    }

    async fn lookup_with(
        &self,
        ip_address: &str,
        override_address: Option<&str>,
        policy: &LookupPolicy,
    ) -> Result<GeoLookupResult, LookupError> {
        let address = match override_address.map(str::trim) {
            Some(address) if !address.is_empty() => address,
            _ => ip_address.trim(),
        };

        if address.is_empty() {
            warn!("Address passed to the geo directory was empty");
            return Err(LookupError::InvalidArgument(
                "address must not be empty".into(),
            ));
        }

        let Some(connection) = self.connections.current_connection() else {
            warn!(
                address = %address,
                "Geo directory connection is unavailable, query skipped"
            );
            return Err(LookupError::not_available("no directory connection"));
        };

        let started = Instant::now();
        let response = match connection.get_ip_info(address).await {
            Ok(response) => {
                debug!(
                    address = %address,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Directory query succeeded"
                );
                response
            }
            Err(e) => {
                return Err(self
                    .handle_query_failure(&connection, address, e, started.elapsed())
                    .await)
            }
        };

        // Single-address queries only use the first record of the batch.
        let Some(record) = response.records.into_iter().next() else {
            error!(address = %address, "Geo directory returned an empty batch");
            return Err(LookupError::InvalidResponse(
                "directory returned no records".into(),
            ));
        };

        if !is_usable_record(&record.ret_code) {
            error!(
                address = %address,
                code = %record.ret_code,
                "Geo directory returned a record with an error return code"
            );
            return Err(LookupError::InvalidResponse(format!(
                "record return code {}",
                record.ret_code
            )));
        }

        Ok(map_record(
            &record,
            address,
            policy.city_confidence_threshold,
        ))
    }

    /// Turns a failed query into a lookup error, invalidating the connection when the link is broken.
    async fn handle_query_failure(
        &self,
        connection: &Arc<Connection>,
        address: &str,
        failure: DirectoryError,
        elapsed: Duration,
    ) -> LookupError {
        let elapsed_ms = elapsed.as_millis() as u64;

        match failure {
            DirectoryError::Provider { ref code, .. } => {
                let class = classify_return_code(code);
                if class == ErrorClass::Recoverable {
                    warn!(
                        address = %address,
                        code = %code,
                        elapsed_ms,
                        "Recoverable error querying geo directory: {}",
                        failure
                    );
                } else {
                    error!(
                        address = %address,
                        code = %code,
                        class = ?class,
                        elapsed_ms,
                        "Unrecoverable error querying geo directory: {}",
                        failure
                    );
                    self.connections.invalidate(connection).await;
                }

                LookupError::ServerNotAvailable {
                    reason: format!("directory query failed with {}", code),
                    source: Some(failure),
                }
            }
            DirectoryError::Connect(_) | DirectoryError::Unexpected(_) => {
                error!(
                    address = %address,
                    elapsed_ms,
                    "Runtime error querying geo directory: {}",
                    failure
                );
                self.connections.invalidate(connection).await;
                LookupError::RuntimeError { source: failure }
            }
        }
    }
}

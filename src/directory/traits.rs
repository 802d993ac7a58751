// 3rd party crates
use async_trait::async_trait;

// Current module imports
use super::errors::DirectoryError;
use super::types::{ConnectionParams, DirectoryResponse};

/// An open session to a geolocation directory service.
///
/// Implementations own whatever pooling the underlying client does, so a
/// single session may serve many concurrent `get_ip_info` calls.
///
/// # Implementation Requirements
///
/// Implementors must:
/// - Answer single-address queries with a batch-shaped response
/// - Report provider-side failures as `DirectoryError::Provider` with the
///   provider's return code, and anything else as `DirectoryError::Unexpected`
/// - Release their resources on `close`
///
/// # Example Implementation
///
/// ```rust
/// # use async_trait::async_trait;
/// # use ipgeo::directory::{DirectoryError, DirectoryResponse, GeoDirectory, IpInfo};
/// struct Static;
///
/// #[async_trait]
/// impl GeoDirectory for Static {
///     async fn get_ip_info(&self, address: &str) -> Result<DirectoryResponse, DirectoryError> {
///         Ok(DirectoryResponse { records: vec![IpInfo::not_found(address)] })
///     }
///
///     async fn close(&self) -> Result<(), DirectoryError> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "static"
///     }
/// }
/// ```
#[async_trait]
pub trait GeoDirectory: Send + Sync {
    /// Queries the directory for a single address.
    ///
    /// # Returns
    ///
    /// * `Ok(DirectoryResponse)` - The directory answered; per-record return
    ///   codes still have to be checked
    /// * `Err(DirectoryError)` - The query itself failed
    async fn get_ip_info(&self, address: &str) -> Result<DirectoryResponse, DirectoryError>;

    /// Closes the session. Queries issued afterwards fail.
    async fn close(&self) -> Result<(), DirectoryError>;

    /// Gets the directory client's name, used in logs.
    fn name(&self) -> &str;
}

/// Opens directory sessions from validated connection parameters.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Opens a new session.
    ///
    /// # Arguments
    ///
    /// * `params` - Pool, timeout, server and retry settings for the session
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn GeoDirectory>)` - Session ready for queries
    /// * `Err(DirectoryError)` - The session could not be created
    async fn connect(&self, params: &ConnectionParams)
        -> Result<Box<dyn GeoDirectory>, DirectoryError>;

    /// Gets the connector's name, used for adapter selection and logs.
    fn name(&self) -> &str;
}

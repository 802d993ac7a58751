// Project imports
use crate::directory::errors::DirectoryError;

// Current module imports
use super::errors::GeoConfigError;

/// Snapshot of the directory settings, as read from the flat property map.
///
/// Values are kept as given; `ConnectionParams::try_from` decides whether
/// they are complete and well-formed enough to open a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoQueryConfig {
    pub connection_pool_size: Option<String>,
    pub client_timeout_ms: Option<String>,
    pub primary_server_ip: Option<String>,
    pub primary_server_port: Option<String>,
    pub secondary_server_ip: Option<String>,
    pub secondary_server_port: Option<String>,
    pub ip_address_override: Option<String>,
    pub city_confidence_threshold: i32,
}

/// Per-lookup settings that travel with a configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupPolicy {
    pub ip_address_override: Option<String>,
    /// Minimum city confidence required to expose zip, city and state.
    pub city_confidence_threshold: i32,
}

/// How a directory return code carried by a failed query affects the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The link is still usable.
    Recoverable,
    /// The link is broken and must be rebuilt.
    Fatal,
    /// The code makes no sense on a failure, or is not known to this client.
    Unknown,
}

/// Result of applying a configuration snapshot to the connection manager.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// A new connection replaced the previous one.
    Connected { connection_id: u64 },
    /// The snapshot was incomplete or malformed; nothing changed.
    Rejected(GeoConfigError),
    /// The directory refused a new session; the previous connection stays.
    ConnectFailed(DirectoryError),
}

/// Zip, city and state, only ever exposed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    pub zip_code: String,
    pub city_name: String,
    pub state_name: String,
}

/// Normalized geolocation of one address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLookupResult {
    pub(crate) source_address: String,
    pub(crate) info_source: char,
    pub(crate) country_code: Option<String>,
    pub(crate) gmt_offset: Option<f32>,
    pub(crate) market_code: i32,
    pub(crate) locality: Option<Locality>,
    pub(crate) latitude: Option<f32>,
    pub(crate) longitude: Option<f32>,
}

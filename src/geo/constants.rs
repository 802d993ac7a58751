// Project imports
use crate::directory::types::NetworkProtocol;

/// Keys of the flat directory property map
pub const CONNECTION_POOL_SIZE: &str = "connection_pool_size";
pub const CLIENT_TIMEOUT_MS: &str = "client_timeout_ms";
pub const PRIMARY_SERVER_IP: &str = "primary_server_ip";
pub const PRIMARY_SERVER_PORT: &str = "primary_server_port";
pub const SECONDARY_SERVER_IP: &str = "secondary_server_ip";
pub const SECONDARY_SERVER_PORT: &str = "secondary_server_port";
/// Non-production only: replaces every looked-up address.
pub const IP_ADDRESS_OVERRIDE: &str = "ip_address_override";
pub const CITY_CONFIDENCE_THRESHOLD: &str = "city_confidence_threshold";

/// Fixed connection parameters
pub const NETWORK_PROTOCOL: NetworkProtocol = NetworkProtocol::Tcp;
pub const MAX_RETRY: u32 = 1;
pub const MAX_WAIT_BLOCKING_MS: u64 = 1;

pub const DEFAULT_CITY_CONFIDENCE_THRESHOLD: i32 = 0;

/// Origin tag stamped on every result built from directory records
pub const GEO_INFO_SOURCE: char = 'Q';

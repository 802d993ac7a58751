// Standard library
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// 3rd party crates
use serde::Deserialize;

/// Return code attached to directory records and directory failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ReturnCode {
    Success,
    NotFound,
    InvalidInput,
    Timeout,
    PoolFailure,
    InvalidLicense,
    ServerUnavailable,
    InternalError,
    /// A code this client does not know about.
    Other(String),
}

/// Fields carried by a directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpInfoField {
    IpAddress,
    Country,
    State,
    City,
    Zip,
    Timezone,
    /// Designated market area code.
    Dma,
    Latitude,
    Longitude,
}

/// One record of a directory response.
#[derive(Debug, Clone, Deserialize)]
pub struct IpInfo {
    pub ret_code: ReturnCode,
    #[serde(default)]
    pub fields: HashMap<String, String>,
    /// Confidence factors keyed by field name.
    #[serde(default)]
    pub confidence: HashMap<String, i32>,
}

/// Batch-shaped directory response. Single-address queries only ever read index 0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryResponse {
    #[serde(rename = "ipinfo", default)]
    pub records: Vec<IpInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkProtocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

/// Validated parameters a connector needs to open a directory session.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionParams {
    pub pool_size: usize,
    pub client_timeout: Duration,
    pub primary: ServerAddress,
    pub secondary: Option<ServerAddress>,
    pub protocol: NetworkProtocol,
    /// How many times the client retries a server before calling it unavailable.
    pub max_retry: u32,
    /// How long a request may block waiting for a pooled connection.
    pub max_wait_blocking: Duration,
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // IPv6 literals need brackets to be told apart from the port.
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

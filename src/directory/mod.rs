//! Directory client layer.
//!
//! Everything the lookup core knows about the remote geolocation directory
//! goes through the `GeoDirectory` and `DirectoryConnector` traits defined
//! here. Two clients ship with the crate:
//!
//! - `http`: JSON over HTTP with a bounded request pool and one failover retry
//! - `fixture`: an in-memory directory for diagnostics and tests

pub mod constants;
pub mod errors;
pub mod fixture;
pub mod functions;
pub mod http;
pub mod impls;
pub mod traits;
pub mod types;

pub use errors::{DirectoryError, FieldParseError};
pub use fixture::FixtureConnector;
pub use functions::connector_for;
pub use http::HttpConnector;
pub use traits::{DirectoryConnector, GeoDirectory};
pub use types::{
    ConnectionParams, DirectoryResponse, IpInfo, IpInfoField, NetworkProtocol, ReturnCode,
    ServerAddress,
};

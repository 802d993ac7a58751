//! Geolocation lookup core.
//!
//! `ConnectionManager` owns the single live directory connection and rebuilds
//! it whenever the directory properties change. `LookupAdapter` runs queries
//! over that connection, decides which failures break the link, and maps
//! directory records into `GeoLookupResult`s, exposing zip, city and state
//! only when the directory is confident enough about the city.

pub mod adapter;
pub mod connection;
pub mod constants;
pub mod errors;
pub mod functions;
pub mod impls;
pub mod types;

pub use adapter::LookupAdapter;
pub use connection::{Connection, ConnectionManager};
pub use errors::{ErrorCode, GeoConfigError, LookupError};
pub use functions::classify_return_code;
pub use types::{ApplyOutcome, ErrorClass, GeoLookupResult, GeoQueryConfig, Locality, LookupPolicy};

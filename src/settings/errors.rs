// 3rd party crates
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0}. Must be one of: error, warn, info, debug, trace")]
    InvalidLogLevel(String),
    #[error("No directory adapter configured")]
    MissingAdapter,
}

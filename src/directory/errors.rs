// 3rd party crates
use thiserror::Error;

// Current module imports
use super::types::ReturnCode;

/// Failures raised by a directory client.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("directory returned {code}: {message}")]
    Provider { code: ReturnCode, message: String },

    #[error("failed to open directory session: {0}")]
    Connect(String),

    #[error("unexpected directory failure: {0}")]
    Unexpected(String),
}

/// A record field was present but could not be read as the requested type.
#[derive(Debug, Clone, Error)]
#[error("field '{field}' has unparsable value '{value}'")]
pub struct FieldParseError {
    pub field: &'static str,
    pub value: String,
}

impl DirectoryError {
    pub fn provider(code: ReturnCode, message: impl Into<String>) -> Self {
        DirectoryError::Provider {
            code,
            message: message.into(),
        }
    }
}

// Standard library
use std::fmt;

// 3rd party crates
use thiserror::Error;

// Project imports
use crate::directory::errors::DirectoryError;

/// Stable error codes reported across the lookup boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidServerAdapterType,
    ServerNotAvailable,
    InvalidResponse,
    InvalidArgument,
    RuntimeError,
}

/// Every failure a lookup can surface. Raw directory errors only travel as sources.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Unknown directory adapter type '{0}'")]
    InvalidServerAdapterType(String),

    #[error("Geo directory not available: {reason}")]
    ServerNotAvailable {
        reason: String,
        #[source]
        source: Option<DirectoryError>,
    },

    #[error("Geo directory returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid lookup argument: {0}")]
    InvalidArgument(String),

    #[error("Runtime error querying geo directory: {source}")]
    RuntimeError {
        #[source]
        source: DirectoryError,
    },
}

/// Why a configuration snapshot cannot be turned into connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoConfigError {
    #[error("Missing required directory settings: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    #[error("Invalid value '{value}' for directory setting {key}")]
    InvalidValue { key: &'static str, value: String },
}

impl ErrorCode {
    pub const fn as_u32(self) -> u32 {
        match self {
            ErrorCode::InvalidServerAdapterType => 21700,
            ErrorCode::ServerNotAvailable => 21701,
            ErrorCode::InvalidResponse => 21702,
            ErrorCode::InvalidArgument => 21703,
            ErrorCode::RuntimeError => 21704,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidServerAdapterType => "INVALID_SERVER_ADAPTER_TYPE",
            ErrorCode::ServerNotAvailable => "SERVER_NOT_AVAILABLE",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::RuntimeError => "RUNTIME_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.as_u32())
    }
}

impl LookupError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LookupError::InvalidServerAdapterType(_) => ErrorCode::InvalidServerAdapterType,
            LookupError::ServerNotAvailable { .. } => ErrorCode::ServerNotAvailable,
            LookupError::InvalidResponse(_) => ErrorCode::InvalidResponse,
            LookupError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            LookupError::RuntimeError { .. } => ErrorCode::RuntimeError,
        }
    }

    pub(crate) fn not_available(reason: impl Into<String>) -> Self {
        LookupError::ServerNotAvailable {
            reason: reason.into(),
            source: None,
        }
    }
}

// Standard library
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// Current module imports
use super::errors::FieldParseError;
use super::types::{IpInfo, IpInfoField, ReturnCode};

impl ReturnCode {
    pub fn as_str(&self) -> &str {
        match self {
            ReturnCode::Success => "SUCCESS",
            ReturnCode::NotFound => "NOT_FOUND",
            ReturnCode::InvalidInput => "INVALID_INPUT",
            ReturnCode::Timeout => "TIMEOUT",
            ReturnCode::PoolFailure => "POOL_FAILURE",
            ReturnCode::InvalidLicense => "INVALID_LICENSE",
            ReturnCode::ServerUnavailable => "SERVER_UNAVAILABLE",
            ReturnCode::InternalError => "INTERNAL_ERROR",
            ReturnCode::Other(code) => code,
        }
    }
}

impl From<String> for ReturnCode {
    fn from(code: String) -> Self {
        match code.trim().to_uppercase().as_str() {
            "SUCCESS" => ReturnCode::Success,
            "NOT_FOUND" => ReturnCode::NotFound,
            "INVALID_INPUT" => ReturnCode::InvalidInput,
            "TIMEOUT" => ReturnCode::Timeout,
            "POOL_FAILURE" => ReturnCode::PoolFailure,
            "INVALID_LICENSE" => ReturnCode::InvalidLicense,
            "SERVER_UNAVAILABLE" => ReturnCode::ServerUnavailable,
            "INTERNAL_ERROR" => ReturnCode::InternalError,
            _ => ReturnCode::Other(code),
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IpInfoField {
    /// Key under which the field travels in a record.
    pub fn as_str(&self) -> &'static str {
        match self {
            IpInfoField::IpAddress => "ip_address",
            IpInfoField::Country => "country",
            IpInfoField::State => "state",
            IpInfoField::City => "city",
            IpInfoField::Zip => "zip",
            IpInfoField::Timezone => "timezone",
            IpInfoField::Dma => "dma",
            IpInfoField::Latitude => "latitude",
            IpInfoField::Longitude => "longitude",
        }
    }
}

impl IpInfo {
    pub fn new(ret_code: ReturnCode) -> Self {
        Self {
            ret_code,
            fields: HashMap::new(),
            confidence: HashMap::new(),
        }
    }

    /// Record returned for an address the directory holds no data for.
    pub fn not_found(address: &str) -> Self {
        Self::new(ReturnCode::NotFound).with_field(IpInfoField::IpAddress, address)
    }

    pub fn with_field(mut self, field: IpInfoField, value: impl Into<String>) -> Self {
        self.fields.insert(field.as_str().to_string(), value.into());
        self
    }

    pub fn with_confidence(mut self, field: IpInfoField, factor: i32) -> Self {
        self.confidence.insert(field.as_str().to_string(), factor);
        self
    }

    /// Returns the raw value of a field. Empty values count as absent.
    pub fn get_string(&self, field: IpInfoField) -> Option<&str> {
        self.fields
            .get(field.as_str())
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn get_float(&self, field: IpInfoField) -> Result<Option<f32>, FieldParseError> {
        self.parse_field(field)
    }

    pub fn get_int(&self, field: IpInfoField) -> Result<Option<i32>, FieldParseError> {
        self.parse_field(field)
    }

    /// Confidence factor the directory attached to a field, if any.
    pub fn get_cf(&self, field: IpInfoField) -> Option<i32> {
        self.confidence.get(field.as_str()).copied()
    }

    fn parse_field<T: FromStr>(&self, field: IpInfoField) -> Result<Option<T>, FieldParseError> {
        match self.get_string(field) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| FieldParseError {
                field: field.as_str(),
                value: raw.to_string(),
            }),
        }
    }
}

// Standard library
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// 3rd party crates
use tracing::warn;

// Project imports
use crate::directory::types::{ConnectionParams, ServerAddress};

// Current module imports
use super::constants::{
    CITY_CONFIDENCE_THRESHOLD, CLIENT_TIMEOUT_MS, CONNECTION_POOL_SIZE,
    DEFAULT_CITY_CONFIDENCE_THRESHOLD, IP_ADDRESS_OVERRIDE, MAX_RETRY, MAX_WAIT_BLOCKING_MS,
    NETWORK_PROTOCOL, PRIMARY_SERVER_IP, PRIMARY_SERVER_PORT, SECONDARY_SERVER_IP,
    SECONDARY_SERVER_PORT,
};
use super::errors::GeoConfigError;
use super::types::{ApplyOutcome, GeoLookupResult, GeoQueryConfig, Locality, LookupPolicy};

impl GeoQueryConfig {
    /// Reads a snapshot from the flat property map. Blank values count as missing.
    pub fn from_properties(properties: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            properties
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let city_confidence_threshold = match get(CITY_CONFIDENCE_THRESHOLD) {
            None => DEFAULT_CITY_CONFIDENCE_THRESHOLD,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Ignoring unparsable {} '{}', using {}",
                    CITY_CONFIDENCE_THRESHOLD, raw, DEFAULT_CITY_CONFIDENCE_THRESHOLD
                );
                DEFAULT_CITY_CONFIDENCE_THRESHOLD
            }),
        };

        Self {
            connection_pool_size: get(CONNECTION_POOL_SIZE),
            client_timeout_ms: get(CLIENT_TIMEOUT_MS),
            primary_server_ip: get(PRIMARY_SERVER_IP),
            primary_server_port: get(PRIMARY_SERVER_PORT),
            secondary_server_ip: get(SECONDARY_SERVER_IP),
            secondary_server_port: get(SECONDARY_SERVER_PORT),
            ip_address_override: get(IP_ADDRESS_OVERRIDE),
            city_confidence_threshold,
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => {
            missing.push(key);
            ""
        }
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, GeoConfigError> {
    value.parse().map_err(|_| GeoConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

impl TryFrom<&GeoQueryConfig> for ConnectionParams {
    type Error = GeoConfigError;

    fn try_from(config: &GeoQueryConfig) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let pool_size = required(&config.connection_pool_size, CONNECTION_POOL_SIZE, &mut missing);
        let timeout = required(&config.client_timeout_ms, CLIENT_TIMEOUT_MS, &mut missing);
        let primary_ip = required(&config.primary_server_ip, PRIMARY_SERVER_IP, &mut missing);
        let primary_port = required(&config.primary_server_port, PRIMARY_SERVER_PORT, &mut missing);
        if !missing.is_empty() {
            return Err(GeoConfigError::MissingSettings(missing));
        }

        // The secondary server is only used when both halves are configured.
        let secondary = match (
            config.secondary_server_ip.as_deref().map(str::trim),
            config.secondary_server_port.as_deref().map(str::trim),
        ) {
            (Some(ip), Some(port)) if !ip.is_empty() && !port.is_empty() => Some(ServerAddress {
                host: ip.to_string(),
                port: parse(port, SECONDARY_SERVER_PORT)?,
            }),
            _ => None,
        };

        Ok(ConnectionParams {
            pool_size: parse(pool_size, CONNECTION_POOL_SIZE)?,
            client_timeout: Duration::from_millis(parse(timeout, CLIENT_TIMEOUT_MS)?),
            primary: ServerAddress {
                host: primary_ip.to_string(),
                port: parse(primary_port, PRIMARY_SERVER_PORT)?,
            },
            secondary,
            protocol: NETWORK_PROTOCOL,
            max_retry: MAX_RETRY,
            max_wait_blocking: Duration::from_millis(MAX_WAIT_BLOCKING_MS),
        })
    }
}

impl From<&GeoQueryConfig> for LookupPolicy {
    fn from(config: &GeoQueryConfig) -> Self {
        Self {
            ip_address_override: config.ip_address_override.clone(),
            city_confidence_threshold: config.city_confidence_threshold,
        }
    }
}

impl ApplyOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ApplyOutcome::Connected { .. })
    }
}

impl GeoLookupResult {
    pub(crate) fn new(source_address: impl Into<String>, info_source: char) -> Self {
        Self {
            source_address: source_address.into(),
            info_source,
            country_code: None,
            gmt_offset: None,
            market_code: 0,
            locality: None,
            latitude: None,
            longitude: None,
        }
    }

    /// The address actually queried, after any override.
    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    pub fn info_source(&self) -> char {
        self.info_source
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn gmt_offset(&self) -> Option<f32> {
        self.gmt_offset
    }

    /// Designated market code; 0 when the directory did not provide one.
    pub fn market_code(&self) -> i32 {
        self.market_code
    }

    pub fn locality(&self) -> Option<&Locality> {
        self.locality.as_ref()
    }

    pub fn zip_code(&self) -> Option<&str> {
        self.locality.as_ref().map(|l| l.zip_code.as_str())
    }

    pub fn city_name(&self) -> Option<&str> {
        self.locality.as_ref().map(|l| l.city_name.as_str())
    }

    pub fn state_name(&self) -> Option<&str> {
        self.locality.as_ref().map(|l| l.state_name.as_str())
    }

    pub fn latitude(&self) -> Option<f32> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<f32> {
        self.longitude
    }
}

struct OrUnset<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrUnset<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("-"),
        }
    }
}

impl fmt::Display for GeoLookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let city = self.city_name().map(str::to_string);
        let state = self.state_name().map(str::to_string);
        let zip = self.zip_code().map(str::to_string);

        writeln!(f, "City : {}", OrUnset(&city))?;
        writeln!(f, "State : {}", OrUnset(&state))?;
        writeln!(f, "Country Code : {}", OrUnset(&self.country_code))?;
        writeln!(f, "Zip code : {}", OrUnset(&zip))?;
        writeln!(f, "Geo Info Source : {}", self.info_source)?;
        writeln!(f, "GMT Offset : {}", OrUnset(&self.gmt_offset))?;
        writeln!(f, "IP address : {}", self.source_address)?;
        writeln!(f, "Latitude : {}", OrUnset(&self.latitude))?;
        writeln!(f, "Longitude : {}", OrUnset(&self.longitude))?;
        write!(f, "Market Code : {}", self.market_code)
    }
}

// Standard library
use std::path::Path;
use std::sync::Arc;

// 3rd party crates
use tracing::error;

// Project imports
use crate::geo::errors::LookupError;

// Current module imports
use super::constants::{FIXTURE_ADAPTER, HTTP_ADAPTER};
use super::fixture::FixtureConnector;
use super::http::HttpConnector;
use super::traits::DirectoryConnector;

/// Selects the directory client named in the settings.
///
/// The fixture client reads its records from `fixture_path` when one is given
/// and starts empty otherwise.
pub fn connector_for(
    adapter: &str,
    fixture_path: Option<&Path>,
) -> Result<Arc<dyn DirectoryConnector>, LookupError> {
    match adapter.trim().to_lowercase().as_str() {
        HTTP_ADAPTER => Ok(Arc::new(HttpConnector)),
        FIXTURE_ADAPTER => match fixture_path {
            Some(path) => FixtureConnector::from_json_file(path)
                .map(|connector| Arc::new(connector) as Arc<dyn DirectoryConnector>)
                .map_err(|e| {
                    error!("Failed to load fixture directory: {}", e);
                    LookupError::RuntimeError { source: e }
                }),
            None => Ok(Arc::new(FixtureConnector::new())),
        },
        _ => {
            error!("Unknown directory adapter type '{}'", adapter);
            Err(LookupError::InvalidServerAdapterType(adapter.to_string()))
        }
    }
}

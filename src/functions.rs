// Standard library
use std::error::Error;
use std::sync::Arc;

// 3rd party crates
use futures::{stream::FuturesUnordered, StreamExt};
use tracing::{info, warn};

// Project imports
use crate::directory::connector_for;
use crate::geo::{ConnectionManager, GeoLookupResult, LookupAdapter, LookupError};
use crate::settings::types::ConfigManager;

/// Looks up every address against the directory described by the settings.
///
/// This function:
/// - Selects the directory client named in the settings
/// - Applies the directory properties, keeping going without a connection
///   if they are incomplete (lookups then report the directory as unavailable)
/// - Runs all lookups concurrently over the shared connection
/// - Prints each result or error as it completes
pub async fn run(config: Arc<ConfigManager>, addresses: Vec<String>) -> Result<(), Box<dyn Error>> {
    let directory = config.get_directory().await;

    let connector = connector_for(&directory.adapter, directory.fixture_path.as_deref())?;
    info!("🌍 Using '{}' geo directory adapter", connector.name());

    let adapter = LookupAdapter::new(ConnectionManager::new(connector));
    if !adapter
        .configuration_changed(&directory.properties)
        .await
        .is_connected()
    {
        warn!("No geo directory connection, lookups will be reported as unavailable");
    }

    let mut lookups = addresses
        .iter()
        .map(|address| {
            let adapter = &adapter;
            async move { (address, adapter.lookup(address).await) }
        })
        .collect::<FuturesUnordered<_>>();

    while let Some((address, outcome)) = lookups.next().await {
        println!("{}", render(address, &outcome));
    }

    adapter.connections().shutdown().await;
    info!("Shutdown complete.");
    Ok(())
}

/// Formats one lookup outcome for the console.
pub fn render(address: &str, outcome: &Result<GeoLookupResult, LookupError>) -> String {
    let separator = "-".repeat(51);
    match outcome {
        Ok(result) => format!("{}\n{}\n{}", separator, address, result),
        Err(e) => format!("{}\n{}\nError {}: {}", separator, address, e.code(), e),
    }
}

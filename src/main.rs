// Standard library
use std::sync::Arc;

// 3rd party crates
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

// Project imports
use ipgeo::functions::run;
use ipgeo::settings::ConfigManager;

/// Entry point for the geolocation lookup client.
///
/// Usage: `ipgeo ADDRESS...`
///
/// Resolves each address through the geo directory configured in
/// `config.toml` and prints the normalized results.
#[tokio::main]
async fn main() {
    // loads the .env file from the current directory or parents.
    dotenvy::dotenv_override().ok();

    let addresses: Vec<String> = std::env::args().skip(1).collect();
    if addresses.is_empty() {
        eprintln!("Usage: ipgeo ADDRESS...");
        std::process::exit(2);
    }

    // Create ConfigManager and wrap it in Arc
    let config: Arc<ConfigManager> = match ConfigManager::new().await {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to initialize configuration: {}", e);
            std::process::exit(1);
        }
    };

    // setup logging.
    let log_level: String = config.get_log_level().await;

    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(log_level)
        .add_directive("hyper_util=error".parse().unwrap())
        .add_directive("reqwest=error".parse().unwrap())
        .add_directive("hyper=error".parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .init();

    info!("⚙️ Settings have been loaded.");

    if let Err(e) = run(config, addresses).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

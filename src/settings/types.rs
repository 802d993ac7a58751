// Standard library
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// 3rd party crates
use serde::Deserialize;
use tokio::sync::RwLock;

#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Directory {
    #[serde(default = "default_adapter")]
    pub adapter: String,

    #[serde(default)]
    pub fixture_path: Option<PathBuf>,

    /// Flat directory properties, handed to the lookup adapter as-is.
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log: Log,
    pub directory: Directory,
}

/// Settings that passed validation.
#[derive(Debug)]
pub struct ValidatedSettings(pub(super) Settings);

fn default_log_level() -> String {
    "info".to_string()
}

fn default_adapter() -> String {
    "http".to_string()
}

/// Manages the application settings, allowing for loading and reloading configurations.
pub struct ConfigManager {
    pub settings: Arc<RwLock<Settings>>,
    pub config_path: PathBuf,
}

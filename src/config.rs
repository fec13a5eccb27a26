//! Application-level configuration, loaded once at start-up.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dao::storage::StorageTarget;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BINGO_BACK_CONFIG_PATH";
const DATABASE_ID_ENV: &str = "BINGO_DATABASE_ID";
const COLLECTION_ID_ENV: &str = "GAMES_COLLECTION_ID";
const STORE_BACKEND_ENV: &str = "STORE_BACKEND";
const DEFAULT_PORT: u16 = 8080;
/// Largest accepted request body; large randomized event pools stay well below it.
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Required settings are absent or empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required configuration: {}", names.join(", "))]
    MissingSettings { names: Vec<&'static str> },
}

/// Document store the server connects to.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Couch,
    Mongo,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "couch" | "couchdb" => Some(Self::Couch),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    port: u16,
    store: StoreBackend,
    database_id: Option<String>,
    collection_id: Option<String>,
    max_body_bytes: usize,
}

impl AppConfig {
    /// Load the configuration from disk, then apply environment overrides.
    ///
    /// A missing or unreadable file falls back to defaults; missing storage
    /// settings are only reported when a request needs them.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        let config = Self::from(raw).with_env_overrides(|name| env::var(name).ok());
        if let Err(err) = config.storage_target() {
            warn!(error = %err, "game creation will fail until storage settings are provided");
        }
        config
    }

    /// Set the database and collection new games are written to.
    pub fn with_storage_target(
        mut self,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        self.database_id = Some(database_id.into());
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Cap the size of request bodies.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(database_id) = lookup(DATABASE_ID_ENV) {
            self.database_id = Some(database_id);
        }
        if let Some(collection_id) = lookup(COLLECTION_ID_ENV) {
            self.collection_id = Some(collection_id);
        }
        if let Some(value) = lookup(STORE_BACKEND_ENV) {
            match StoreBackend::parse(&value) {
                Some(store) => self.store = store,
                None => warn!(value = %value, "unknown store backend; keeping {:?}", self.store),
            }
        }
        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }
        self
    }

    /// Port the HTTP server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Largest request body accepted by the game routes.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Selected storage backend.
    pub fn store(&self) -> StoreBackend {
        self.store
    }

    /// Database and collection for new games; both must be non-empty.
    pub fn storage_target(&self) -> Result<StorageTarget, ConfigurationError> {
        let database_id = non_empty(self.database_id.as_deref());
        let collection_id = non_empty(self.collection_id.as_deref());

        match (database_id, collection_id) {
            (Some(database_id), Some(collection_id)) => Ok(StorageTarget {
                database_id: database_id.to_string(),
                collection_id: collection_id.to_string(),
            }),
            (database_id, collection_id) => {
                let mut names = Vec::new();
                if database_id.is_none() {
                    names.push("database_id");
                }
                if collection_id.is_none() {
                    names.push("collection_id");
                }
                Err(ConfigurationError::MissingSettings { names })
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: u16,
    store: StoreBackend,
    database_id: Option<String>,
    collection_id: Option<String>,
    max_body_bytes: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: StoreBackend::default(),
            database_id: None,
            collection_id: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            port: value.port,
            store: value.store,
            database_id: value.database_id,
            collection_id: value.collection_id,
            max_body_bytes: value.max_body_bytes,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

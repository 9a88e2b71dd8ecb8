//! Startup configuration, read once from the environment (`.env` supported).

use std::fmt;

use crate::viewmodel::SyncMode;

pub const DEFAULT_COLLECTION: &str = "participantes";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    /// Name of the document collection holding the roster. Deployments have
    /// used more than one name; nothing migrates between them.
    pub collection: String,
    pub sync_mode: SyncMode,
    pub bind_addr: String,
    pub session_key: Option<String>,
    pub db_max_connections: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "{key} has invalid value '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store_backend = match get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let sync_mode = match get("SYNC_MODE").as_deref() {
            None | Some("subscribe") => SyncMode::Subscribe,
            Some("fetch") => SyncMode::FetchOnce,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SYNC_MODE",
                    value: other.to_string(),
                });
            }
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            None => 8,
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "DB_MAX_CONNECTIONS",
                        value: v,
                    });
                }
            },
        };

        Ok(Config {
            database_url,
            store_backend,
            collection: get("COLLECTION_NAME").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            sync_mode,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_key: get("SESSION_KEY"),
            db_max_connections,
        })
    }
}

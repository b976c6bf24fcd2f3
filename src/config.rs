use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MedBook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub const ENV_DB_PATH: &str = "MEDBOOK_DB_PATH";
pub const ENV_BIND_ADDR: &str = "MEDBOOK_BIND_ADDR";
pub const ENV_TOKENS_FILE: &str = "MEDBOOK_TOKENS_FILE";

/// Get the application data directory
/// ~/MedBook/ on all platforms, current directory if home is unknown.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medbook_lib=info,medbook=info,tower_http=warn"
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub tokens_file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup` (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = app_data_dir();

        let db_path = lookup(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("medbook.db"));

        let bind_raw = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: ENV_BIND_ADDR,
            value: bind_raw.clone(),
        })?;

        let tokens_file = lookup(ENV_TOKENS_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("tokens.json"));

        Ok(Self {
            db_path,
            bind_addr,
            tokens_file,
        })
    }
}

pub mod api;
pub mod authorization;
pub mod config;
pub mod core_state;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod patients;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use api::server::ServerError;
use api::types::{TokenFileError, TokenRegistry};
use api::ApiContext;
use config::{Config, ConfigError};
use core_state::{CoreError, CoreState};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Tokens(#[from] TokenFileError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Signal handler failed: {0}")]
    Signal(std::io::Error),
}

/// Start the booking service and block until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env()?;

    let core = CoreState::new(config.db_path.clone());
    core.initialize()?;

    let registry = load_tokens(&config)?;
    let ctx = ApiContext::new(Arc::new(core), Arc::new(registry));

    let server = api::start_booking_api_server(ctx, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    tracing::info!("Ctrl-C received, shutting down");
    server.stop().await;
    Ok(())
}

/// A missing tokens file is not fatal: the API still serves `/api/health`
/// and answers 401 everywhere else.
fn load_tokens(config: &Config) -> Result<TokenRegistry, StartupError> {
    if !config.tokens_file.exists() {
        tracing::warn!(
            path = %config.tokens_file.display(),
            "Tokens file not found, no caller can authenticate"
        );
        return Ok(TokenRegistry::new());
    }
    let registry = TokenRegistry::from_file(&config.tokens_file)?;
    tracing::info!(tokens = registry.len(), "Bearer tokens loaded");
    Ok(registry)
}

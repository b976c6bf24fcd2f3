//! Booking API server lifecycle: bind, serve, shut down.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::api::router::booking_api_router;
use crate::api::types::ApiContext;

/// Session metadata for a running server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSession {
    pub server_addr: SocketAddr,
    pub started_at: String,
}

/// Handle to a running booking API server.
pub struct BookingApiServer {
    pub session: ServerSession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl BookingApiServer {
    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Booking API server shutdown signal sent");
        }
    }

    /// Signal shutdown and wait for in-flight requests to drain.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Booking API server task failed: {e}");
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Failed to get server address: {0}")]
    LocalAddr(std::io::Error),
}

/// Start the booking API on `addr` (port 0 picks an ephemeral port).
///
/// Builds the full `booking_api_router` with middleware stack and spawns
/// the axum server in a background tokio task.
pub async fn start_booking_api_server(
    ctx: ApiContext,
    addr: SocketAddr,
) -> Result<BookingApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let app = booking_api_router(ctx);

    let session = ServerSession {
        server_addr: addr,
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Booking API server received shutdown signal");
        };

        tracing::info!(%addr, "Booking API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Booking API server error: {e}");
        }

        tracing::info!("Booking API server stopped");
    });

    Ok(BookingApiServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::sync::Arc;

    use super::*;
    use crate::api::types::TokenRegistry;
    use crate::core_state::CoreState;
    use crate::models::Principal;

    fn localhost() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    }

    fn test_ctx(dir: &tempfile::TempDir) -> (ApiContext, String) {
        let core = CoreState::new(dir.path().join("medbook.db"));
        core.initialize().unwrap();
        let registry = TokenRegistry::new();
        let token = "tok-patient-1".to_string();
        registry.register(&token, Principal::patient(1));
        (ApiContext::new(Arc::new(core), Arc::new(registry)), token)
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = test_ctx(&dir);
        let server = start_booking_api_server(ctx, localhost()).await.unwrap();
        let port = server.session.server_addr.port();
        assert!(port > 0);

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "no-store"
        );
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Service is up");
        assert_eq!(body["data"]["status"], "ok");

        server.stop().await;
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, token) = test_ctx(&dir);
        let server = start_booking_api_server(ctx, localhost()).await.unwrap();
        let port = server.session.server_addr.port();
        let url = format!("http://127.0.0.1:{port}/api/patient/appointments");

        let client = reqwest::Client::new();
        let resp = client.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        // Token is valid but user 1 is not seeded: lazy provisioning finds no user.
        let resp = client.get(&url).bearer_auth(&token).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.stop().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = test_ctx(&dir);
        let server = start_booking_api_server(ctx.clone(), localhost()).await.unwrap();

        let taken = server.session.server_addr;
        let result = start_booking_api_server(ctx, taken).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));

        server.stop().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = test_ctx(&dir);
        let mut server = start_booking_api_server(ctx, localhost()).await.unwrap();
        server.shutdown();
        server.shutdown();
        server.stop().await;
    }
}

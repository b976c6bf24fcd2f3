//! Access logging middleware.
//!
//! Logs every API request with the caller, method, path, and response
//! status. Runs innermost (after auth has injected the `Principal`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::models::Principal;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let principal = req.extensions().get::<Principal>().copied();

    let response = next.run(req).await;
    let status = response.status().as_u16();

    match principal {
        Some(p) => tracing::info!(
            user_id = p.user_id,
            role = %p.role,
            %method,
            path,
            status,
            "API access"
        ),
        None => tracing::info!(%method, path, status, "API access (anonymous)"),
    }

    response
}

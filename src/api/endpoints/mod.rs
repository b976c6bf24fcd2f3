//! API endpoint handlers.
//!
//! Handlers stay thin: parse the request, hand the `Principal` and a fresh
//! connection to the lifecycle engine on a blocking thread, wrap the result.

pub mod appointments;
pub mod doctor;
pub mod health;
pub mod patient;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;

/// Marks the operation abandoned if the handler future is dropped
/// (client disconnect) before the blocking work reports back.
struct AbandonOnDrop {
    abandoned: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.abandoned.store(true, Ordering::SeqCst);
        }
    }
}

/// Run `op` against a fresh connection on the blocking pool.
///
/// SQLite calls block (busy_timeout waits included), so they stay off the
/// async workers. If the request is dropped mid-flight, the connection's
/// pending COMMIT turns into a ROLLBACK and nothing is persisted.
pub(crate) async fn with_conn<T, F>(ctx: &ApiContext, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let abandoned = Arc::new(AtomicBool::new(false));
    let mut guard = AbandonOnDrop {
        abandoned: abandoned.clone(),
        armed: true,
    };

    let core = ctx.core.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
        let mut conn = core.open_db()?;
        db::rollback_commits_when(&conn, abandoned.clone());
        let result = op(&mut conn);
        if abandoned.load(Ordering::SeqCst) {
            tracing::info!("Request dropped before completion, changes rolled back");
        }
        result
    })
    .await;
    guard.armed = false;

    result.map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

/// Path ids arrive as text so a malformed one maps to our own 400 body.
pub(crate) fn parse_appointment_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!("invalid appointment id '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::types::TokenRegistry;
    use crate::core_state::CoreState;
    use crate::lifecycle::{self, input};
    use crate::models::enums::Role;
    use crate::models::Principal;

    fn test_ctx(dir: &tempfile::TempDir) -> ApiContext {
        let core = CoreState::new(dir.path().join("medbook.db"));
        core.initialize().unwrap();
        let conn = core.open_db().unwrap();
        db::insert_user_with_id(&conn, 42, "Budi", "budi@example.com", Role::Patient).unwrap();
        db::insert_user_with_id(&conn, 70, "Dr. Sari", "sari@example.com", Role::Doctor).unwrap();
        db::insert_doctor(&conn, Some(7), 70).unwrap();
        ApiContext::new(Arc::new(core), Arc::new(TokenRegistry::new()))
    }

    fn count(ctx: &ApiContext, table: &str) -> i64 {
        let conn = ctx.core.open_db().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn completed_request_commits() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&dir);
        let new = input::parse_new_appointment(7, None, "2024-03-01", "09:00", "fever").unwrap();

        let created = with_conn(&ctx, move |conn| {
            Ok(lifecycle::create_appointment(conn, &Principal::patient(42), &new)?)
        })
        .await
        .unwrap();

        assert!(created.id > 0);
        assert_eq!(count(&ctx, "appointments"), 1);
    }

    #[tokio::test]
    async fn dropped_request_rolls_back_booking() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_ctx(&dir);
        let new = input::parse_new_appointment(7, None, "2024-03-01", "09:00", "fever").unwrap();

        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<bool>();

        let request = with_conn(&ctx, move |conn| {
            // Hold the operation until the caller has gone away.
            release_rx.recv().ok();
            let result = lifecycle::create_appointment(conn, &Principal::patient(42), &new);
            done_tx.send(result.is_err()).ok();
            Ok(())
        });
        let outcome = tokio::time::timeout(Duration::from_millis(50), request).await;
        assert!(outcome.is_err(), "request should still be in flight");

        release_tx.send(()).unwrap();
        let failed = tokio::task::spawn_blocking(move || done_rx.recv().unwrap())
            .await
            .unwrap();

        assert!(failed);
        assert_eq!(count(&ctx, "appointments"), 0);
        assert_eq!(count(&ctx, "appointment_events"), 0);
        assert_eq!(count(&ctx, "patients"), 0);
    }

    #[test]
    fn appointment_id_must_be_positive_integer() {
        assert_eq!(parse_appointment_id("12").unwrap(), 12);
        assert!(parse_appointment_id("0").is_err());
        assert!(parse_appointment_id("-4").is_err());
        assert!(parse_appointment_id("abc").is_err());
        assert!(parse_appointment_id("").is_err());
    }
}

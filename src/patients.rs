//! Patient directory: maps a user account to its patient record.
//!
//! Patient rows are provisioned lazily the first time their user books.
//! The insert is conflict-tolerant on the unique `user_id`, so two first
//! requests racing for the same user still leave exactly one row.

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::Patient;

/// Look up the patient owned by `user_id`, creating an empty one if absent.
pub fn resolve_patient(conn: &Connection, user_id: i64) -> Result<Patient, DatabaseError> {
    if let Some(patient) = db::get_patient_by_user(conn, user_id)? {
        return Ok(patient);
    }

    if !db::user_exists(conn, user_id)? {
        return Err(DatabaseError::not_found("User", user_id));
    }

    if db::insert_patient_for_user(conn, user_id)? {
        tracing::info!(user_id, "Provisioned patient record");
    }

    // Re-read: the row may have been created by a concurrent request.
    db::get_patient_by_user(conn, user_id)?
        .ok_or_else(|| DatabaseError::not_found("Patient", user_id))
}

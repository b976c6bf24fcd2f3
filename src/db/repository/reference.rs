//! Read access to directory-owned reference data (users, doctors, schedules).
//!
//! The directory services own these tables; this crate never writes them
//! outside test fixtures.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;

pub fn user_exists(conn: &Connection, user_id: i64) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Resolve the doctor profile owned by a user account.
pub fn get_doctor_id_for_user(conn: &Connection, user_id: i64) -> Result<Option<i64>, DatabaseError> {
    let id = conn
        .query_row(
            "SELECT id FROM doctors WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn doctor_exists(conn: &Connection, doctor_id: i64) -> Result<bool, DatabaseError> {
    let found = conn
        .query_row("SELECT 1 FROM doctors WHERE id = ?1", params![doctor_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Owning doctor of a schedule, or `None` if the schedule does not exist.
pub fn get_schedule_doctor(conn: &Connection, schedule_id: i64) -> Result<Option<i64>, DatabaseError> {
    let doctor_id = conn
        .query_row(
            "SELECT doctor_id FROM doctor_schedules WHERE id = ?1",
            params![schedule_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(doctor_id)
}

#[cfg(test)]
pub use fixtures::*;

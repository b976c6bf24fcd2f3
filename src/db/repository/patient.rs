use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

pub fn get_patient_by_user(conn: &Connection, user_id: i64) -> Result<Option<Patient>, DatabaseError> {
    let patient = conn
        .query_row(
            "SELECT id, user_id, date_of_birth, phone, address, blood_type, created_at, updated_at
             FROM patients WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Patient {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    date_of_birth: row.get(2)?,
                    phone: row.get(3)?,
                    address: row.get(4)?,
                    blood_type: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            },
        )
        .optional()?;
    Ok(patient)
}

/// Insert an empty patient row for `user_id` unless one exists.
///
/// `user_id` is UNIQUE, so concurrent first bookings collapse into one
/// row. Returns true when this call created it.
pub fn insert_patient_for_user(conn: &Connection, user_id: i64) -> Result<bool, DatabaseError> {
    let now = Utc::now().naive_utc();
    let inserted = conn.execute(
        "INSERT INTO patients (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)
         ON CONFLICT(user_id) DO NOTHING",
        params![user_id, now],
    )?;
    Ok(inserted == 1)
}

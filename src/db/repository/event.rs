use chrono::Utc;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::{AppointmentAction, AppointmentStatus};
use crate::models::*;

/// Append a lifecycle event. Callers pass the transaction they mutated in.
pub fn insert_appointment_event(
    conn: &Connection,
    appointment_id: i64,
    action: AppointmentAction,
    from_status: Option<AppointmentStatus>,
    to_status: AppointmentStatus,
    actor: &Principal,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointment_events
         (appointment_id, action, from_status, to_status, actor_role, actor_user_id, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            appointment_id,
            action,
            from_status,
            to_status,
            actor.role,
            actor.user_id,
            Utc::now().naive_utc(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Events for one appointment, oldest first.
pub fn list_appointment_events(
    conn: &Connection,
    appointment_id: i64,
) -> Result<Vec<AppointmentEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_id, action, from_status, to_status, actor_role, actor_user_id, occurred_at
         FROM appointment_events WHERE appointment_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![appointment_id], |row| {
        Ok(AppointmentEvent {
            id: row.get(0)?,
            appointment_id: row.get(1)?,
            action: row.get(2)?,
            from_status: row.get(3)?,
            to_status: row.get(4)?,
            actor_role: row.get(5)?,
            actor_user_id: row.get(6)?,
            occurred_at: row.get(7)?,
        })
    })?;

    let events = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "a.id, a.patient_id, a.doctor_id, a.schedule_id, \
     a.appointment_date, a.start_time_slot, a.complaint, a.status, a.created_at, a.updated_at";

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        schedule_id: row.get(3)?,
        appointment_date: row.get(4)?,
        start_time_slot: row.get(5)?,
        complaint: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Reads an optional `(name, email)` pair starting at `idx`.
fn party_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<PartyName>> {
    let name: Option<String> = row.get(idx)?;
    let email: Option<String> = row.get(idx + 1)?;
    if name.is_none() && email.is_none() {
        return Ok(None);
    }
    Ok(Some(PartyName {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
    }))
}

/// Insert a new appointment. Participates in whatever transaction `conn`
/// belongs to; assigns the identifier and both timestamps.
pub fn insert_appointment(
    conn: &Connection,
    patient_id: i64,
    new: &NewAppointment,
    status: AppointmentStatus,
) -> Result<Appointment, DatabaseError> {
    let now = Utc::now().naive_utc();
    let start_time_slot = new.start_time.format("%H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO appointments
         (patient_id, doctor_id, schedule_id, appointment_date, start_time_slot,
          complaint, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            patient_id,
            new.doctor_id,
            new.schedule_id,
            new.appointment_date,
            start_time_slot,
            new.complaint,
            status,
            now,
        ],
    )?;

    Ok(Appointment {
        id: conn.last_insert_rowid(),
        patient_id,
        doctor_id: new.doctor_id,
        schedule_id: new.schedule_id,
        appointment_date: new.appointment_date,
        start_time_slot,
        complaint: new.complaint.clone(),
        status,
        created_at: now,
        updated_at: now,
    })
}

/// Plain row lookup, no joins. Used inside mutating transactions.
pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments a WHERE a.id = ?1");
    let appointment = conn
        .query_row(&sql, params![id], appointment_from_row)
        .optional()?;
    Ok(appointment)
}

/// Appointment with doctor and patient display names.
pub fn get_appointment_detail(
    conn: &Connection,
    id: i64,
) -> Result<AppointmentDetail, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS}, du.name, du.email, pu.name, pu.email
         FROM appointments a
         LEFT JOIN doctors d ON d.id = a.doctor_id
         LEFT JOIN users du ON du.id = d.user_id
         LEFT JOIN patients p ON p.id = a.patient_id
         LEFT JOIN users pu ON pu.id = p.user_id
         WHERE a.id = ?1"
    );

    conn.query_row(&sql, params![id], |row| {
        Ok(AppointmentDetail {
            appointment: appointment_from_row(row)?,
            doctor: party_from_row(row, 10)?,
            patient: party_from_row(row, 12)?,
        })
    })
    .optional()?
    .ok_or_else(|| DatabaseError::not_found("Appointment", id))
}

/// Move an appointment from `expected` to `next`.
///
/// The update only matches while the row still holds `expected`. When
/// nothing matched, the row is re-read to tell a missing appointment
/// (`NotFound`) from one whose status moved underneath us (`StatusConflict`).
pub fn update_appointment_status(
    conn: &Connection,
    id: i64,
    expected: AppointmentStatus,
    next: AppointmentStatus,
) -> Result<Appointment, DatabaseError> {
    let now = Utc::now().naive_utc();
    let affected = conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2
         WHERE id = ?3 AND status = ?4",
        params![next, now, id, expected],
    )?;

    match get_appointment(conn, id)? {
        None => Err(DatabaseError::not_found("Appointment", id)),
        Some(current) if affected == 0 => Err(DatabaseError::StatusConflict {
            id,
            expected: expected.to_string(),
            actual: current.status.to_string(),
        }),
        Some(current) => Ok(current),
    }
}

/// A patient's appointments, most recent first.
pub fn list_appointments_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS}, du.name, du.email
         FROM appointments a
         LEFT JOIN doctors d ON d.id = a.doctor_id
         LEFT JOIN users du ON du.id = d.user_id
         WHERE a.patient_id = ?1
         ORDER BY a.appointment_date DESC, a.start_time_slot DESC, a.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(AppointmentDetail {
            appointment: appointment_from_row(row)?,
            doctor: party_from_row(row, 10)?,
            patient: None,
        })
    })?;

    let appointments = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(appointments)
}

/// A doctor's appointments, soonest first.
pub fn list_appointments_by_doctor(
    conn: &Connection,
    doctor_id: i64,
) -> Result<Vec<AppointmentDetail>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS}, pu.name, pu.email
         FROM appointments a
         LEFT JOIN patients p ON p.id = a.patient_id
         LEFT JOIN users pu ON pu.id = p.user_id
         WHERE a.doctor_id = ?1
         ORDER BY a.appointment_date ASC, a.start_time_slot ASC, a.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![doctor_id], |row| {
        Ok(AppointmentDetail {
            appointment: appointment_from_row(row)?,
            doctor: None,
            patient: party_from_row(row, 10)?,
        })
    })?;

    let appointments = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(appointments)
}

//! Appointment lifecycle engine: booking, cancellation and doctor-driven
//! status transitions.
//!
//! Every mutation runs in one `BEGIN IMMEDIATE` transaction. SQLite takes
//! its write lock at BEGIN, so the ownership/status read and the
//! conditional update that follows see the same row state. Errors return
//! before `commit`, and dropping the transaction rolls everything back.

pub mod input;
pub mod transitions;

use rusqlite::{Connection, TransactionBehavior};

use crate::authorization::{self, AccessError};
use crate::db::{self, DatabaseError};
use crate::models::enums::{AppointmentAction, AppointmentStatus, Role};
use crate::models::*;
use crate::patients;

use transitions::Actor;

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not allowed: appointment {0} is not yours")]
    NotAllowed(i64),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },
    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl AppointmentError {
    fn not_found(entity_type: &str, id: i64) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }
}

impl From<DatabaseError> for AppointmentError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            DatabaseError::StatusConflict { id, expected, actual } => Self::InvalidStatus(format!(
                "appointment {id} changed from {expected} to {actual} concurrently"
            )),
            other => Self::Database(other),
        }
    }
}

impl From<rusqlite::Error> for AppointmentError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(err))
    }
}

impl From<AccessError> for AppointmentError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Database(e) => e.into(),
            other => Self::Forbidden(other.to_string()),
        }
    }
}

fn invalid_transition(from: AppointmentStatus, to: AppointmentStatus, actor: Actor) -> AppointmentError {
    if from.is_terminal() {
        AppointmentError::InvalidStatus(format!("{from} is final, cannot move to {to}"))
    } else {
        let allowed: Vec<&str> = transitions::allowed_targets(from, actor)
            .iter()
            .map(|s| s.as_str())
            .collect();
        AppointmentError::InvalidStatus(format!(
            "cannot move from {from} to {to} (allowed: {})",
            allowed.join(", ")
        ))
    }
}

// ─── Mutations ────────────────────────────────────────────────────────────────

/// Book an appointment for the calling patient. Always starts Pending.
///
/// The patient record is provisioned inside the same transaction, so a
/// failed booking leaves neither row behind. Schedule quotas are not
/// checked: the schedule reference is informational.
pub fn create_appointment(
    conn: &mut Connection,
    principal: &Principal,
    new: &NewAppointment,
) -> Result<Appointment, AppointmentError> {
    authorization::require_role(principal, Role::Patient)?;

    if !db::doctor_exists(conn, new.doctor_id)? {
        return Err(AppointmentError::not_found("Doctor", new.doctor_id));
    }
    if let Some(schedule_id) = new.schedule_id {
        match db::get_schedule_doctor(conn, schedule_id)? {
            None => return Err(AppointmentError::not_found("Schedule", schedule_id)),
            Some(owner) if owner != new.doctor_id => {
                return Err(AppointmentError::InvalidInput(format!(
                    "schedule {schedule_id} does not belong to doctor {}",
                    new.doctor_id
                )))
            }
            Some(_) => {}
        }
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let patient = patients::resolve_patient(&tx, principal.user_id)?;
    let appointment = db::insert_appointment(&tx, patient.id, new, AppointmentStatus::Pending)?;
    db::insert_appointment_event(
        &tx,
        appointment.id,
        AppointmentAction::Created,
        None,
        appointment.status,
        principal,
    )?;
    tx.commit()?;

    tracing::info!(
        appointment_id = appointment.id,
        patient_id = patient.id,
        doctor_id = appointment.doctor_id,
        date = %appointment.appointment_date,
        slot = %appointment.start_time_slot,
        "Appointment created"
    );
    Ok(appointment)
}

/// Cancel one of the calling patient's own open appointments.
///
/// Cancellation stores `Rejected`; the event trail records it as
/// `cancelled` so it stays distinct from a doctor's rejection.
pub fn cancel_appointment(
    conn: &mut Connection,
    principal: &Principal,
    appointment_id: i64,
) -> Result<Appointment, AppointmentError> {
    authorization::require_role(principal, Role::Patient)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let patient = patients::resolve_patient(&tx, principal.user_id)?;
    let current = db::get_appointment(&tx, appointment_id)?
        .ok_or_else(|| AppointmentError::not_found("Appointment", appointment_id))?;

    if current.patient_id != patient.id {
        tracing::warn!(
            appointment_id,
            user_id = principal.user_id,
            "Cancellation refused: not the owner"
        );
        return Err(AppointmentError::NotAllowed(appointment_id));
    }

    let target = AppointmentStatus::Rejected;
    if !transitions::is_allowed(current.status, target, Actor::Patient) {
        return Err(invalid_transition(current.status, target, Actor::Patient));
    }

    let updated = db::update_appointment_status(&tx, appointment_id, current.status, target)?;
    db::insert_appointment_event(
        &tx,
        appointment_id,
        AppointmentAction::Cancelled,
        Some(current.status),
        target,
        principal,
    )?;
    tx.commit()?;

    tracing::info!(appointment_id, from = %current.status, "Appointment cancelled by patient");
    Ok(updated)
}

/// Doctor-driven status change. `status_text` is free text and goes
/// through the synonym table first.
pub fn update_appointment_status(
    conn: &mut Connection,
    principal: &Principal,
    appointment_id: i64,
    status_text: &str,
) -> Result<Appointment, AppointmentError> {
    let doctor_id = authorization::resolve_doctor_id(conn, principal)?;

    let target = AppointmentStatus::normalize(status_text).ok_or_else(|| {
        AppointmentError::InvalidStatus(format!("unknown status '{}'", status_text.trim()))
    })?;
    if target == AppointmentStatus::Pending {
        return Err(AppointmentError::InvalidStatus(
            "status may not return to Pending".into(),
        ));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = db::get_appointment(&tx, appointment_id)?
        .ok_or_else(|| AppointmentError::not_found("Appointment", appointment_id))?;

    if current.doctor_id != doctor_id {
        tracing::warn!(
            appointment_id,
            doctor_id,
            "Status update refused: appointment assigned to another doctor"
        );
        return Err(AppointmentError::NotAllowed(appointment_id));
    }

    if !transitions::is_allowed(current.status, target, Actor::Doctor) {
        tracing::warn!(appointment_id, from = %current.status, to = %target, "Transition refused");
        return Err(invalid_transition(current.status, target, Actor::Doctor));
    }

    let updated = db::update_appointment_status(&tx, appointment_id, current.status, target)?;
    db::insert_appointment_event(
        &tx,
        appointment_id,
        AppointmentAction::StatusUpdated,
        Some(current.status),
        target,
        principal,
    )?;
    tx.commit()?;

    tracing::info!(appointment_id, from = %current.status, to = %target, "Appointment status updated");
    Ok(updated)
}

// ─── Queries ──────────────────────────────────────────────────────────────────

/// The calling patient's appointments, most recent first.
pub fn get_appointment_history(
    conn: &Connection,
    principal: &Principal,
) -> Result<Vec<AppointmentDetail>, AppointmentError> {
    authorization::require_role(principal, Role::Patient)?;
    let patient = patients::resolve_patient(conn, principal.user_id)?;
    Ok(db::list_appointments_by_patient(conn, patient.id)?)
}

/// The calling doctor's appointments, soonest first.
pub fn get_doctor_appointments(
    conn: &Connection,
    principal: &Principal,
) -> Result<Vec<AppointmentDetail>, AppointmentError> {
    let doctor_id = authorization::resolve_doctor_id(conn, principal)?;
    Ok(db::list_appointments_by_doctor(conn, doctor_id)?)
}

/// Single appointment with display names. Readable by the owning patient,
/// the assigned doctor, or an admin.
pub fn get_appointment_detail(
    conn: &Connection,
    principal: &Principal,
    appointment_id: i64,
) -> Result<AppointmentDetail, AppointmentError> {
    let detail = db::get_appointment_detail(conn, appointment_id)?;
    let decision = authorization::check_appointment_access(conn, principal, &detail.appointment)?;
    if !decision.allowed {
        return Err(AppointmentError::Forbidden(format!(
            "no access to appointment {appointment_id}"
        )));
    }
    tracing::debug!(appointment_id, reason = ?decision.reason, "Appointment read");
    Ok(detail)
}

/// Lifecycle trail of one appointment, oldest first. Same access rule as
/// [`get_appointment_detail`].
pub fn get_appointment_events(
    conn: &Connection,
    principal: &Principal,
    appointment_id: i64,
) -> Result<Vec<AppointmentEvent>, AppointmentError> {
    get_appointment_detail(conn, principal, appointment_id)?;
    Ok(db::list_appointment_events(conn, appointment_id)?)
}

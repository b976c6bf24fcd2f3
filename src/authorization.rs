//! Role gates and appointment read access.
//!
//! The principal is resolved and typed once at the transport edge. Here it
//! is only compared against roles and ownership, never re-parsed.
//!
//! Read access to a single appointment, checked in order:
//! 1. Admin → allowed
//! 2. Owning patient → allowed
//! 3. Assigned doctor → allowed
//! 4. Default → deny

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::enums::Role;
use crate::models::{Appointment, Principal};

/// Why read access was granted (or denied), for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    Admin,
    OwnAppointment,
    AssignedDoctor,
    Denied,
}

#[derive(Debug, Clone, Copy)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self { allowed: true, reason }
    }

    fn deny() -> Self {
        Self { allowed: false, reason: AccessReason::Denied }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{0} role required")]
    RoleRequired(Role),
    #[error("No doctor profile for user {0}")]
    NoDoctorProfile(i64),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub fn require_role(principal: &Principal, role: Role) -> Result<(), AccessError> {
    if principal.role == role {
        Ok(())
    } else {
        Err(AccessError::RoleRequired(role))
    }
}

/// Resolve the doctor profile behind a doctor principal.
pub fn resolve_doctor_id(conn: &Connection, principal: &Principal) -> Result<i64, AccessError> {
    require_role(principal, Role::Doctor)?;
    db::get_doctor_id_for_user(conn, principal.user_id)?
        .ok_or(AccessError::NoDoctorProfile(principal.user_id))
}

/// Decide whether `principal` may read `appointment`.
///
/// Lookups here never provision a patient record.
pub fn check_appointment_access(
    conn: &Connection,
    principal: &Principal,
    appointment: &Appointment,
) -> Result<AccessDecision, AccessError> {
    let decision = match principal.role {
        Role::Admin => AccessDecision::allow(AccessReason::Admin),
        Role::Patient => match db::get_patient_by_user(conn, principal.user_id)? {
            Some(patient) if patient.id == appointment.patient_id => {
                AccessDecision::allow(AccessReason::OwnAppointment)
            }
            _ => AccessDecision::deny(),
        },
        Role::Doctor => match db::get_doctor_id_for_user(conn, principal.user_id)? {
            Some(doctor_id) if doctor_id == appointment.doctor_id => {
                AccessDecision::allow(AccessReason::AssignedDoctor)
            }
            _ => AccessDecision::deny(),
        },
    };
    Ok(decision)
}

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentAction, AppointmentStatus, Role};

/// Stored appointment row.
///
/// `start_time_slot` is always `HH:MM:SS`. `schedule_id` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub schedule_id: Option<i64>,
    pub appointment_date: NaiveDate,
    pub start_time_slot: String,
    pub complaint: String,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Display fields joined from the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyName {
    pub name: String,
    pub email: String,
}

/// Appointment with denormalized doctor/patient display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<PartyName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PartyName>,
}

/// Validated booking input. The patient is never part of it: it comes
/// from the caller's principal.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub schedule_id: Option<i64>,
    pub appointment_date: NaiveDate,
    pub start_time: NaiveTime,
    pub complaint: String,
}

/// One row of the appointment lifecycle trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEvent {
    pub id: i64,
    pub appointment_id: i64,
    pub action: AppointmentAction,
    pub from_status: Option<AppointmentStatus>,
    pub to_status: AppointmentStatus,
    pub actor_role: Role,
    pub actor_user_id: i64,
    pub occurred_at: NaiveDateTime,
}

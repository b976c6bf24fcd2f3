//! Booking input parsing: ISO dates and `HH:MM[:SS]` start slots.

use chrono::{NaiveDate, NaiveTime, Timelike};

use super::AppointmentError;
use crate::models::NewAppointment;

/// True when `raw` has digits everywhere except `sep` at `sep_positions`.
fn has_shape(raw: &str, len: usize, sep: u8, sep_positions: &[usize]) -> bool {
    raw.len() == len
        && raw.bytes().enumerate().all(|(i, b)| {
            if sep_positions.contains(&i) {
                b == sep
            } else {
                b.is_ascii_digit()
            }
        })
}

/// Strict `YYYY-MM-DD`; single-digit months or days are rejected.
pub fn parse_appointment_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    let raw = raw.trim();
    let invalid = || AppointmentError::InvalidInput("appointment_date must be YYYY-MM-DD".into());
    if !has_shape(raw, 10, b'-', &[4, 7]) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

/// Accepts `HH:MM` or `HH:MM:SS`, two digits per field. Leap seconds are refused.
pub fn parse_start_time(raw: &str) -> Result<NaiveTime, AppointmentError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppointmentError::InvalidInput(
            "start_time_slot is required (HH:MM)".into(),
        ));
    }
    let invalid =
        || AppointmentError::InvalidInput("start_time_slot must be HH:MM or HH:MM:SS".into());

    let parsed = if has_shape(raw, 5, b':', &[2]) {
        NaiveTime::parse_from_str(raw, "%H:%M")
    } else if has_shape(raw, 8, b':', &[2, 5]) {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
    } else {
        return Err(invalid());
    };

    match parsed {
        Ok(time) if time.nanosecond() < 1_000_000_000 => Ok(time),
        _ => Err(invalid()),
    }
}

/// Canonical stored form of a start slot.
pub fn normalize_start_time(raw: &str) -> Result<String, AppointmentError> {
    Ok(parse_start_time(raw)?.format("%H:%M:%S").to_string())
}

/// Validate raw booking fields into a `NewAppointment`.
pub fn parse_new_appointment(
    doctor_id: i64,
    schedule_id: Option<i64>,
    appointment_date: &str,
    start_time_slot: &str,
    complaint: &str,
) -> Result<NewAppointment, AppointmentError> {
    if doctor_id <= 0 {
        return Err(AppointmentError::InvalidInput("doctor_id is required".into()));
    }
    Ok(NewAppointment {
        doctor_id,
        schedule_id,
        appointment_date: parse_appointment_date(appointment_date)?,
        start_time: parse_start_time(start_time_slot)?,
        complaint: complaint.trim().to_string(),
    })
}

//! Doctor-facing endpoints: worklist and status changes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::{parse_appointment_id, with_conn};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Envelope};
use crate::lifecycle;
use crate::models::{Appointment, AppointmentDetail, Principal};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// `GET /api/doctor/appointments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Envelope<Vec<AppointmentDetail>>>, ApiError> {
    let appointments = with_conn(&ctx, move |conn| {
        Ok(lifecycle::get_doctor_appointments(conn, &principal)?)
    })
    .await?;
    Ok(Json(Envelope::new("Doctor appointments", appointments)))
}

/// `PATCH /api/doctor/appointments/:id` with `{"status": "..."}`.
pub async fn update_status(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Envelope<Appointment>>, ApiError> {
    let id = parse_appointment_id(&raw_id)?;
    let Json(req) = body?;
    let appointment = with_conn(&ctx, move |conn| {
        Ok(lifecycle::update_appointment_status(
            conn,
            &principal,
            id,
            &req.status,
        )?)
    })
    .await?;
    Ok(Json(Envelope::new("Appointment status updated", appointment)))
}

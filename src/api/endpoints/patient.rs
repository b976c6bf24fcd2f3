//! Patient-facing appointment endpoints.
//!
//! - `POST  /api/patient/appointments` — book
//! - `GET   /api/patient/appointments` — own history
//! - `GET   /api/patient/appointments/:id` — detail
//! - `PATCH /api/patient/appointments/:id/cancel` — cancel

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use super::{parse_appointment_id, with_conn};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Envelope};
use crate::lifecycle::{self, input};
use crate::models::{Appointment, AppointmentDetail, Principal};

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: i64,
    #[serde(default)]
    pub schedule_id: Option<i64>,
    pub appointment_date: String,
    #[serde(alias = "start_time_slot")]
    pub start_time: String,
    #[serde(default)]
    pub complaint: String,
}

/// `POST /api/patient/appointments`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Appointment>>), ApiError> {
    let Json(req) = body?;
    let new = input::parse_new_appointment(
        req.doctor_id,
        req.schedule_id,
        &req.appointment_date,
        &req.start_time,
        &req.complaint,
    )?;

    let appointment = with_conn(&ctx, move |conn| {
        Ok(lifecycle::create_appointment(conn, &principal, &new)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("Appointment created", appointment)),
    ))
}

/// `GET /api/patient/appointments`
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Envelope<Vec<AppointmentDetail>>>, ApiError> {
    let appointments = with_conn(&ctx, move |conn| {
        Ok(lifecycle::get_appointment_history(conn, &principal)?)
    })
    .await?;
    Ok(Json(Envelope::new("Appointment history", appointments)))
}

/// `GET /api/patient/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<AppointmentDetail>>, ApiError> {
    let id = parse_appointment_id(&raw_id)?;
    let detail = with_conn(&ctx, move |conn| {
        Ok(lifecycle::get_appointment_detail(conn, &principal, id)?)
    })
    .await?;
    Ok(Json(Envelope::new("Appointment detail", detail)))
}

/// `PATCH /api/patient/appointments/:id/cancel`
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<Appointment>>, ApiError> {
    let id = parse_appointment_id(&raw_id)?;
    let appointment = with_conn(&ctx, move |conn| {
        Ok(lifecycle::cancel_appointment(conn, &principal, id)?)
    })
    .await?;
    Ok(Json(Envelope::new("Appointment cancelled", appointment)))
}

//! Shared appointment reads: detail and event trail for any party with access.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use super::{parse_appointment_id, with_conn};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Envelope};
use crate::lifecycle;
use crate::models::{AppointmentDetail, AppointmentEvent, Principal};

/// `GET /api/appointments/:id`
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

/// `GET /api/appointments/:id/events`
pub async fn events(
    State(ctx): State<ApiContext>,
    Extension(principal): Extension<Principal>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<Vec<AppointmentEvent>>>, ApiError> {
    let id = parse_appointment_id(&raw_id)?;
    let events = with_conn(&ctx, move |conn| {
        Ok(lifecycle::get_appointment_events(conn, &principal, id)?)
    })
    .await?;
    Ok(Json(Envelope::new("Appointment events", events)))
}

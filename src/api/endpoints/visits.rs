//! Visit endpoints.
//!
//! - `GET|PUT|DELETE /api/visits/:id`
//! - `POST /api/visits/:id/follow-up/complete`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{Local, Utc};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::models::{Visit, VisitForm};
use crate::visits;

/// `GET /api/visits/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError> {
    let visit = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::owned_visit(&conn, &doctor.doctor_id, &id)?)
    })
    .await?;
    Ok(Json(visit))
}

/// `PUT /api/visits/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<VisitForm>,
) -> Result<Json<Visit>, ApiError> {
    let visit = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::update_visit(&conn, &doctor.doctor_id, &id, &form, &Local::now())?)
    })
    .await?;
    Ok(Json(visit))
}

/// `DELETE /api/visits/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::delete_visit(&conn, &doctor.doctor_id, &id)?)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/visits/:id/follow-up/complete`
pub async fn complete_follow_up(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError> {
    let visit = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::complete_follow_up(&conn, &doctor.doctor_id, &id, Utc::now())?)
    })
    .await?;
    Ok(Json(visit))
}

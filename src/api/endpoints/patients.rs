//! Patient endpoints.
//!
//! - `GET /api/patients?q=`: searchable patient cards
//! - `POST /api/patients`: add a patient
//! - `GET|PUT|DELETE /api/patients/:id`
//! - `GET|POST /api/patients/:id/visits`

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::models::{Patient, PatientForm, Visit, VisitForm};
use crate::patients::{self, PatientCard};
use crate::visits;

#[derive(Deserialize)]
pub struct PatientListQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedPatient {
    pub id: Uuid,
    pub deleted_visits: usize,
}

/// `GET /api/patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<Vec<PatientCard>>, ApiError> {
    let cards = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(patients::list_patient_cards(&conn, &doctor.doctor_id, query.q.as_deref())?)
    })
    .await?;
    Ok(Json(cards))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Json(form): Json<PatientForm>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(patients::create_patient(&conn, &doctor.doctor_id, &form, Utc::now())?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(patients::owned_patient(&conn, &doctor.doctor_id, &id)?)
    })
    .await?;
    Ok(Json(patient))
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<PatientForm>,
) -> Result<Json<Patient>, ApiError> {
    let patient = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(patients::update_patient(&conn, &doctor.doctor_id, &id, &form, Utc::now())?)
    })
    .await?;
    Ok(Json(patient))
}

/// `DELETE /api/patients/:id`: removes the patient's visits too.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedPatient>, ApiError> {
    let deleted_visits = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(patients::delete_patient(&conn, &doctor.doctor_id, &id)?)
    })
    .await?;
    Ok(Json(DeletedPatient { id, deleted_visits }))
}

/// `GET /api/patients/:id/visits`: newest first.
pub async fn visits(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let list = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::patient_visits(&conn, &doctor.doctor_id, &id)?)
    })
    .await?;
    Ok(Json(list))
}

/// `POST /api/patients/:id/visits`
pub async fn add_visit(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
    Json(form): Json<VisitForm>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let visit = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(visits::create_visit(&conn, &doctor.doctor_id, &id, &form, &Local::now())?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

//! `POST /api/patients/:id/summary`: AI summary of a patient's history.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Local;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::summary::{summarize_patient, PatientSummary};
use crate::{patients, visits};

pub async fn generate(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientSummary>, ApiError> {
    let summary = run_blocking(move || {
        let conn = ctx.open_db()?;
        let patient = patients::owned_patient(&conn, &doctor.doctor_id, &id)?;
        let history = visits::patient_visits(&conn, &doctor.doctor_id, &id)?;
        drop(conn);
        Ok(summarize_patient(ctx.summary_client.as_ref(), &patient, &history, &Local::now())?)
    })
    .await?;
    Ok(Json(summary))
}

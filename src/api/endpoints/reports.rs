//! PDF downloads.
//!
//! - `GET /api/patients/:id/report`: full medical report
//! - `GET /api/visits/:id/prescription`: single-visit prescription

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::Local;
use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::db;
use crate::models::DoctorProfile;
use crate::report;
use crate::{patients, visits};

/// Header-safe filename: anything outside `[A-Za-z0-9._-]` becomes `_`.
fn header_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", header_filename(filename)),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn doctor_profile(conn: &Connection, doctor: &DoctorContext) -> Result<DoctorProfile, ApiError> {
    let record = db::get_doctor(conn, &doctor.doctor_id)?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
    Ok(DoctorProfile::from(&record))
}

/// `GET /api/patients/:id/report`
pub async fn patient_report(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (filename, bytes) = run_blocking(move || {
        let conn = ctx.open_db()?;
        let profile = doctor_profile(&conn, &doctor)?;
        let patient = patients::owned_patient(&conn, &doctor.doctor_id, &id)?;
        let history = visits::patient_visits(&conn, &doctor.doctor_id, &id)?;
        let now = Local::now();
        let bytes = report::generate_patient_report(&profile, &patient, &history, &now)?;
        Ok((report::patient_report_filename(&patient.name, now.date_naive()), bytes))
    })
    .await?;
    Ok(pdf_response(&filename, bytes))
}

/// `GET /api/visits/:id/prescription`
pub async fn prescription(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (filename, bytes) = run_blocking(move || {
        let conn = ctx.open_db()?;
        let profile = doctor_profile(&conn, &doctor)?;
        let visit = visits::owned_visit(&conn, &doctor.doctor_id, &id)?;
        let patient = patients::owned_patient(&conn, &doctor.doctor_id, &visit.patient_id)?;
        let now = Local::now();
        let bytes = report::generate_prescription(&profile, &patient, &visit, &Local)?;
        Ok((report::prescription_filename(&patient.name, now.date_naive()), bytes))
    })
    .await?;
    Ok(pdf_response(&filename, bytes))
}

//! `GET /api/doctor`: the signed-in doctor's profile.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::db;
use crate::models::DoctorProfile;

pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<DoctorProfile>, ApiError> {
    let profile = run_blocking(move || {
        let conn = ctx.open_db()?;
        let record = db::get_doctor(&conn, &doctor.doctor_id)?
            .ok_or_else(|| ApiError::NotFound("Doctor not found".into()))?;
        Ok(DoctorProfile::from(&record))
    })
    .await?;
    Ok(Json(profile))
}

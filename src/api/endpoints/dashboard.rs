//! `GET /api/dashboard`: statistics, follow-ups and recent patients.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::Local;

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::dashboard::{load_dashboard, DashboardData};

pub async fn overview(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<Json<DashboardData>, ApiError> {
    let data = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(load_dashboard(&conn, &doctor.doctor_id, &Local::now())?)
    })
    .await?;
    Ok(Json(data))
}

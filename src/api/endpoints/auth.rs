//! Account endpoints.
//!
//! - `POST /api/auth/register`: create an unverified account
//! - `POST /api/auth/verify`: consume a verification token
//! - `POST /api/auth/resend-verification`: mail a fresh token
//! - `POST /api/auth/login`: open a session
//! - `POST /api/auth/logout`: close the current session

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, ApiContext, DoctorContext};
use crate::auth::{self, LoginRequest, LoginResponse, RegisterRequest};
use crate::models::DoctorProfile;

#[derive(Serialize)]
pub struct AccountResponse {
    pub doctor: DoctorProfile,
    pub email_verified: bool,
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let doctor = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(auth::register(&conn, &ctx.hasher, ctx.mailer.as_ref(), &req, Utc::now())?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            doctor: DoctorProfile::from(&doctor),
            email_verified: false,
            message: "Account created. Check your email to verify your address.",
        }),
    ))
}

/// `POST /api/auth/verify`
pub async fn verify(
    State(ctx): State<ApiContext>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let doctor = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(auth::verify_email(&conn, &req.token)?)
    })
    .await?;

    Ok(Json(AccountResponse {
        doctor: DoctorProfile::from(&doctor),
        email_verified: true,
        message: "Email verified. You can now log in.",
    }))
}

/// `POST /api/auth/resend-verification`: same answer whether or not the
/// email is registered.
pub async fn resend_verification(
    State(ctx): State<ApiContext>,
    Json(req): Json<ResendRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(auth::resend_verification(&conn, ctx.mailer.as_ref(), &req.email)?)
    })
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "If the account exists and is unverified, a new link has been sent.",
        }),
    ))
}

/// `POST /api/auth/login`
///
/// Attempts per email share one budget across all client addresses.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let key = format!("login:{}", auth::normalize_email(&req.email));
    {
        let mut limiter = ctx
            .login_limiter
            .lock()
            .map_err(|_| ApiError::Internal("login limiter lock".into()))?;
        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(key = %key, retry_after, "Login attempts throttled");
            ApiError::RateLimited { retry_after }
        })?;
    }

    let response = run_blocking(move || {
        let conn = ctx.open_db()?;
        Ok(auth::login(&conn, &ctx.hasher, &ctx.sessions, &req)?)
    })
    .await?;
    Ok(Json(response))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(doctor): Extension<DoctorContext>,
) -> Result<StatusCode, ApiError> {
    auth::logout(&ctx.sessions, &doctor.token)?;
    tracing::info!(doctor_id = %doctor.doctor_id, "Doctor logged out");
    Ok(StatusCode::NO_CONTENT)
}

//! Doctor accounts: registration, email verification, login and logout.
//!
//! Passwords are PBKDF2-hashed. Verification tokens and session tokens are
//! handed out once and only their SHA-256 hashes are kept.

pub mod mailer;
pub mod password;
pub mod session;

pub use mailer::*;
pub use password::*;
pub use session::*;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Doctor, DoctorProfile};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Please verify your email before logging in")]
    EmailNotVerified,
    #[error("Verification link is invalid or already used")]
    InvalidVerificationToken,
    #[error("Session is invalid")]
    InvalidSession,
    #[error("Session expired, please log in again")]
    SessionExpired,
    #[error("{0}")]
    Invalid(String),
    #[error("Session store lock poisoned")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub clinic_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub doctor: DoctorProfile,
}

/// Lower-cased, trimmed form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

/// Create an unverified doctor account and mail a verification token.
pub fn register(
    conn: &Connection,
    hasher: &PasswordHasher,
    mailer: &dyn Mailer,
    req: &RegisterRequest,
    now: DateTime<Utc>,
) -> Result<Doctor, AuthError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim();
    let clinic_name = req.clinic_name.trim();

    if name.is_empty() {
        return Err(AuthError::Invalid("Name is required".into()));
    }
    if clinic_name.is_empty() {
        return Err(AuthError::Invalid("Clinic name is required".into()));
    }
    if !looks_like_email(&email) {
        return Err(AuthError::Invalid("Please enter a valid email address".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if db::get_doctor_by_email(conn, &email)?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let digest = hasher.hash(&req.password);
    let token = generate_token();
    let doctor = Doctor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        clinic_name: clinic_name.to_string(),
        email,
        email_verified: false,
        password_hash: digest.hash,
        password_salt: digest.salt,
        verification_token: Some(hash_token_hex(&token)),
        created_at: now,
    };
    match db::insert_doctor(conn, &doctor) {
        Ok(()) => {}
        Err(DatabaseError::ConstraintViolation(_)) => return Err(AuthError::EmailTaken),
        Err(e) => return Err(e.into()),
    }

    mailer.send_verification(&doctor.email, &doctor.name, &token);
    tracing::info!(doctor_id = %doctor.id, "Doctor registered, verification pending");
    Ok(doctor)
}

/// Consume a verification token and mark the account verified.
pub fn verify_email(conn: &Connection, token: &str) -> Result<Doctor, AuthError> {
    let doctor = db::get_doctor_by_verification_token(conn, &hash_token_hex(token.trim()))?
        .ok_or(AuthError::InvalidVerificationToken)?;
    db::mark_email_verified(conn, &doctor.id)?;
    tracing::info!(doctor_id = %doctor.id, "Email verified");
    Ok(Doctor {
        email_verified: true,
        verification_token: None,
        ..doctor
    })
}

/// Issue a fresh verification token. Silent for unknown or verified accounts
/// so the endpoint does not reveal which emails are registered.
pub fn resend_verification(conn: &Connection, mailer: &dyn Mailer, email: &str) -> Result<(), AuthError> {
    let Some(doctor) = db::get_doctor_by_email(conn, &normalize_email(email))? else {
        tracing::debug!("Verification resend for unknown email");
        return Ok(());
    };
    if doctor.email_verified {
        return Ok(());
    }
    let token = generate_token();
    db::set_verification_token(conn, &doctor.id, Some(&hash_token_hex(&token)))?;
    mailer.send_verification(&doctor.email, &doctor.name, &token);
    Ok(())
}

/// Check credentials and open a session. Unverified accounts are refused.
pub fn login(
    conn: &Connection,
    hasher: &PasswordHasher,
    sessions: &SessionStore,
    req: &LoginRequest,
) -> Result<LoginResponse, AuthError> {
    let Some(doctor) = db::get_doctor_by_email(conn, &normalize_email(&req.email))? else {
        // same PBKDF2 cost as a known email
        hasher.verify(&req.password, &PasswordDigest::placeholder());
        return Err(AuthError::InvalidCredentials);
    };

    let digest = PasswordDigest {
        hash: doctor.password_hash.clone(),
        salt: doctor.password_salt.clone(),
    };
    if !hasher.verify(&req.password, &digest) {
        tracing::warn!(doctor_id = %doctor.id, "Failed login attempt");
        return Err(AuthError::InvalidCredentials);
    }
    if !doctor.email_verified {
        return Err(AuthError::EmailNotVerified);
    }

    let token = sessions.create(doctor.id)?;
    tracing::info!(doctor_id = %doctor.id, "Doctor logged in");
    Ok(LoginResponse {
        token,
        doctor: DoctorProfile::from(&doctor),
    })
}

pub fn logout(sessions: &SessionStore, token: &str) -> Result<(), AuthError> {
    sessions.revoke(token)
}

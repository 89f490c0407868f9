use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered doctor account. Owns every patient and visit it creates.
#[derive(Debug, Clone)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub clinic_name: String,
    pub email: String,
    pub email_verified: bool,
    pub password_hash: String,
    pub password_salt: String,
    pub verification_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a doctor, safe to send to the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub clinic_name: String,
    pub email: String,
}

impl From<&Doctor> for DoctorProfile {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            clinic_name: doctor.clinic_name.clone(),
            email: doctor.email.clone(),
        }
    }
}

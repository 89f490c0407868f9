//! Patient records: ownership checks, CRUD and the searchable list.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::*;
use crate::validation::{validate_patient, ValidationError};

/// Characters of medical history shown on a list card.
pub const HISTORY_PREVIEW_CHARS: usize = 80;

/// Errors from record-level operations on patients and visits.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("Access denied")]
    AccessDenied,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

// ─── List cards ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PatientCard {
    pub id: Uuid,
    pub name: String,
    pub initial: char,
    pub age: u32,
    pub gender: Gender,
    pub contact: String,
    pub blood_group: Option<BloodGroup>,
    pub history_preview: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Patient> for PatientCard {
    fn from(p: &Patient) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            initial: p.initial(),
            age: p.age,
            gender: p.gender,
            contact: p.contact.clone(),
            blood_group: p.blood_group,
            history_preview: p.medical_history.as_deref().map(|h| truncate_preview(h, HISTORY_PREVIEW_CHARS)),
            created_at: p.created_at,
        }
    }
}

/// Cut `text` to `max` characters, marking the cut with "...".
pub fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

/// Case-insensitive substring match on name, contact, blood group and address.
/// A blank query matches everyone.
pub fn search_patients<'a>(patients: &'a [Patient], query: &str) -> Vec<&'a Patient> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return patients.iter().collect();
    }
    patients
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.contact.contains(&needle)
                || p.blood_group.is_some_and(|b| b.as_str().to_lowercase().contains(&needle))
                || p.address
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&needle))
        })
        .collect()
}

// ─── Operations ─────────────────────────────────────────────

/// Load a patient and check it belongs to `doctor_id`.
pub fn owned_patient(conn: &Connection, doctor_id: &Uuid, id: &Uuid) -> Result<Patient, RecordError> {
    let patient = db::get_patient(conn, id)?.ok_or(RecordError::NotFound { entity: "Patient" })?;
    if patient.doctor_id != *doctor_id {
        tracing::warn!(doctor_id = %doctor_id, patient_id = %id, "Cross-doctor patient access refused");
        return Err(RecordError::AccessDenied);
    }
    Ok(patient)
}

pub fn list_patient_cards(
    conn: &Connection,
    doctor_id: &Uuid,
    query: Option<&str>,
) -> Result<Vec<PatientCard>, RecordError> {
    let patients = db::list_patients(conn, doctor_id)?;
    Ok(search_patients(&patients, query.unwrap_or(""))
        .into_iter()
        .map(PatientCard::from)
        .collect())
}

pub fn create_patient(
    conn: &Connection,
    doctor_id: &Uuid,
    form: &PatientForm,
    now: DateTime<Utc>,
) -> Result<Patient, RecordError> {
    let fields = validate_patient(form)?;
    let patient = Patient::new(*doctor_id, fields, now);
    db::insert_patient(conn, &patient)?;
    tracing::info!(patient_id = %patient.id, "Patient added");
    Ok(patient)
}

pub fn update_patient(
    conn: &Connection,
    doctor_id: &Uuid,
    id: &Uuid,
    form: &PatientForm,
    now: DateTime<Utc>,
) -> Result<Patient, RecordError> {
    let mut patient = owned_patient(conn, doctor_id, id)?;
    let fields = validate_patient(form)?;
    patient.apply(fields, now);
    db::update_patient(conn, &patient)?;
    Ok(patient)
}

/// Delete a patient with all of their visits. Returns the visit count removed.
pub fn delete_patient(conn: &Connection, doctor_id: &Uuid, id: &Uuid) -> Result<usize, RecordError> {
    owned_patient(conn, doctor_id, id)?;
    let visits = db::delete_patient_cascade(conn, id)?;
    tracing::info!(patient_id = %id, visits, "Patient deleted");
    Ok(visits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::test_support::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap()
    }

    fn form(name: &str) -> PatientForm {
        PatientForm {
            name: name.into(),
            age: 52,
            gender: "Male".into(),
            contact: "9123456780".into(),
            address: Some("7 Hill Street, Pune".into()),
            blood_group: Some("AB-".into()),
            emergency_contact: None,
            medical_history: None,
        }
    }

    #[test]
    fn preview_truncates_long_history() {
        let long = "x".repeat(100);
        let preview = truncate_preview(&long, HISTORY_PREVIEW_CHARS);
        assert_eq!(preview.chars().count(), 83);
        assert!(preview.ends_with("..."));
        assert_eq!(truncate_preview("short", 80), "short");
        assert_eq!(truncate_preview(&"y".repeat(80), 80).len(), 80);
    }

    #[test]
    fn search_covers_name_contact_blood_group_and_address() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "s@example.com");
        create_patient(&conn, &doctor.id, &form("Rahul Mehta"), now()).unwrap();
        let mut other = form("Sita Devi");
        other.contact = "9000000001".into();
        other.blood_group = Some("O+".into());
        other.address = Some("Lake View".into());
        create_patient(&conn, &doctor.id, &other, now()).unwrap();

        let patients = db::list_patients(&conn, &doctor.id).unwrap();
        let names = |q: &str| -> Vec<String> {
            search_patients(&patients, q).iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names("rahul"), vec!["Rahul Mehta"]);
        assert_eq!(names("9000"), vec!["Sita Devi"]);
        assert_eq!(names("ab-"), vec!["Rahul Mehta"]);
        assert_eq!(names("LAKE"), vec!["Sita Devi"]);
        assert_eq!(names("  ").len(), 2);
        assert!(names("nobody").is_empty());
    }

    #[test]
    fn other_doctors_cannot_touch_patient() {
        let conn = open_memory_database().unwrap();
        let owner = make_doctor(&conn, "owner@example.com");
        let intruder = make_doctor(&conn, "intruder@example.com");
        let patient = create_patient(&conn, &owner.id, &form("Private"), now()).unwrap();

        assert!(matches!(
            owned_patient(&conn, &intruder.id, &patient.id),
            Err(RecordError::AccessDenied)
        ));
        assert!(matches!(
            delete_patient(&conn, &intruder.id, &patient.id),
            Err(RecordError::AccessDenied)
        ));
        assert!(matches!(
            owned_patient(&conn, &owner.id, &Uuid::new_v4()),
            Err(RecordError::NotFound { .. })
        ));
    }

    #[test]
    fn update_keeps_created_at() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "u@example.com");
        let patient = create_patient(&conn, &doctor.id, &form("Before"), now()).unwrap();
        let later = now() + chrono::Duration::days(2);

        let updated = update_patient(&conn, &doctor.id, &patient.id, &form("After"), later).unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.created_at, now());
        assert_eq!(updated.updated_at, later);
    }

    #[test]
    fn invalid_form_is_validation_error() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "v@example.com");
        let mut bad = form("Bad");
        bad.contact = "123".into();
        assert!(matches!(
            create_patient(&conn, &doctor.id, &bad, now()),
            Err(RecordError::Validation(_))
        ));
        assert!(db::list_patients(&conn, &doctor.id).unwrap().is_empty());
    }

    #[test]
    fn cards_carry_initial_and_preview() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "c@example.com");
        let mut f = form("zara");
        f.medical_history = Some("h".repeat(90));
        create_patient(&conn, &doctor.id, &f, now()).unwrap();

        let cards = list_patient_cards(&conn, &doctor.id, None).unwrap();
        assert_eq!(cards[0].initial, 'Z');
        assert!(cards[0].history_preview.as_ref().unwrap().ends_with("..."));
    }
}

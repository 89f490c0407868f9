//! Visit records: logging, editing and follow-up completion.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::models::*;
use crate::patients::{owned_patient, RecordError};
use crate::validation::validate_visit;

/// Load a visit and check it belongs to `doctor_id`.
pub fn owned_visit(conn: &Connection, doctor_id: &Uuid, id: &Uuid) -> Result<Visit, RecordError> {
    let visit = db::get_visit(conn, id)?.ok_or(RecordError::NotFound { entity: "Visit" })?;
    if visit.doctor_id != *doctor_id {
        tracing::warn!(doctor_id = %doctor_id, visit_id = %id, "Cross-doctor visit access refused");
        return Err(RecordError::AccessDenied);
    }
    Ok(visit)
}

/// A patient's visits, newest first.
pub fn patient_visits(conn: &Connection, doctor_id: &Uuid, patient_id: &Uuid) -> Result<Vec<Visit>, RecordError> {
    owned_patient(conn, doctor_id, patient_id)?;
    Ok(db::list_patient_visits(conn, patient_id)?)
}

/// Record a visit. The form's date and time are read in `now`'s time zone.
pub fn create_visit<Tz: TimeZone>(
    conn: &Connection,
    doctor_id: &Uuid,
    patient_id: &Uuid,
    form: &VisitForm,
    now: &DateTime<Tz>,
) -> Result<Visit, RecordError> {
    let patient = owned_patient(conn, doctor_id, patient_id)?;
    let fields = validate_visit(form, &now.timezone(), now.date_naive(), None)?;
    let visit = Visit::new(*doctor_id, patient.id, &patient.name, fields, now.with_timezone(&Utc));
    db::insert_visit(conn, &visit)?;
    tracing::info!(visit_id = %visit.id, patient_id = %patient.id, "Visit recorded");
    Ok(visit)
}

pub fn update_visit<Tz: TimeZone>(
    conn: &Connection,
    doctor_id: &Uuid,
    id: &Uuid,
    form: &VisitForm,
    now: &DateTime<Tz>,
) -> Result<Visit, RecordError> {
    let mut visit = owned_visit(conn, doctor_id, id)?;
    let fields = validate_visit(form, &now.timezone(), now.date_naive(), visit.follow_up_date)?;
    visit.apply(fields, now.with_timezone(&Utc));
    db::update_visit(conn, &visit)?;
    Ok(visit)
}

pub fn delete_visit(conn: &Connection, doctor_id: &Uuid, id: &Uuid) -> Result<(), RecordError> {
    owned_visit(conn, doctor_id, id)?;
    db::delete_visit(conn, id)?;
    tracing::info!(visit_id = %id, "Visit deleted");
    Ok(())
}

/// Mark a visit's follow-up as done.
pub fn complete_follow_up(
    conn: &Connection,
    doctor_id: &Uuid,
    id: &Uuid,
    now: DateTime<Utc>,
) -> Result<Visit, RecordError> {
    let mut visit = owned_visit(conn, doctor_id, id)?;
    db::complete_follow_up(conn, id, &now)?;
    visit.follow_up_completed = true;
    visit.follow_up_completed_at = Some(now);
    visit.updated_at = now;
    Ok(visit)
}

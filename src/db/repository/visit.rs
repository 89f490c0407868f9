use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{date_from_sql, timestamp_from_sql, timestamp_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::*;

const VISIT_COLUMNS: &str = "id, patient_id, doctor_id, patient_name, visit_date, symptoms,
     diagnosis, medicines, notes, needs_follow_up, follow_up_date, follow_up_reason,
     follow_up_completed, follow_up_completed_at, created_at, updated_at";

pub fn insert_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO visits (id, patient_id, doctor_id, patient_name, visit_date, symptoms,
         diagnosis, medicines, notes, needs_follow_up, follow_up_date, follow_up_reason,
         follow_up_completed, follow_up_completed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            visit.id.to_string(),
            visit.patient_id.to_string(),
            visit.doctor_id.to_string(),
            visit.patient_name,
            visit.visit_date.as_ref().map(timestamp_to_sql),
            visit.symptoms,
            visit.diagnosis,
            medicines_to_sql(&visit.medicines)?,
            visit.notes,
            visit.needs_follow_up as i32,
            visit.follow_up_date.map(|d| d.to_string()),
            visit.follow_up_reason,
            visit.follow_up_completed as i32,
            visit.follow_up_completed_at.as_ref().map(timestamp_to_sql),
            timestamp_to_sql(&visit.created_at),
            timestamp_to_sql(&visit.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_visit(conn: &Connection, id: &Uuid) -> Result<Option<Visit>, DatabaseError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], visit_row_from_rusqlite)
        .optional()?;
    row.map(visit_from_row).transpose()
}

/// Every visit owned by a doctor, newest first. Undated visits sort last.
pub fn list_visits(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(
        conn,
        "doctor_id = ?1 ORDER BY visit_date IS NULL, visit_date DESC",
        &doctor_id.to_string(),
    )
}

/// A patient's visit history, newest first.
pub fn list_patient_visits(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(
        conn,
        "patient_id = ?1 ORDER BY visit_date IS NULL, visit_date DESC",
        &patient_id.to_string(),
    )
}

/// Open follow-ups, soonest due date first.
pub fn list_pending_follow_ups(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Visit>, DatabaseError> {
    query_visits(
        conn,
        "doctor_id = ?1 AND needs_follow_up = 1 AND follow_up_completed = 0
         AND follow_up_date IS NOT NULL ORDER BY follow_up_date ASC",
        &doctor_id.to_string(),
    )
}

fn query_visits(conn: &Connection, clause: &str, key: &str) -> Result<Vec<Visit>, DatabaseError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key], visit_row_from_rusqlite)?;

    let mut visits = Vec::new();
    for row in rows {
        visits.push(visit_from_row(row?)?);
    }
    Ok(visits)
}

pub fn update_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE visits SET visit_date = ?2, symptoms = ?3, diagnosis = ?4, medicines = ?5,
         notes = ?6, needs_follow_up = ?7, follow_up_date = ?8, follow_up_reason = ?9,
         follow_up_completed = ?10, follow_up_completed_at = ?11, updated_at = ?12
         WHERE id = ?1",
        params![
            visit.id.to_string(),
            visit.visit_date.as_ref().map(timestamp_to_sql),
            visit.symptoms,
            visit.diagnosis,
            medicines_to_sql(&visit.medicines)?,
            visit.notes,
            visit.needs_follow_up as i32,
            visit.follow_up_date.map(|d| d.to_string()),
            visit.follow_up_reason,
            visit.follow_up_completed as i32,
            visit.follow_up_completed_at.as_ref().map(timestamp_to_sql),
            timestamp_to_sql(&visit.updated_at),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Visit".into(),
            id: visit.id.to_string(),
        });
    }
    Ok(())
}

/// Mark a follow-up as done at `completed_at`.
pub fn complete_follow_up(
    conn: &Connection,
    id: &Uuid,
    completed_at: &DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let stamp = timestamp_to_sql(completed_at);
    let changed = conn.execute(
        "UPDATE visits SET follow_up_completed = 1, follow_up_completed_at = ?2, updated_at = ?2
         WHERE id = ?1",
        params![id.to_string(), stamp],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Visit".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_visit(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM visits WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Visit".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn medicines_to_sql(medicines: &[Medicine]) -> Result<String, DatabaseError> {
    serde_json::to_string(medicines)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("medicines: {e}")))
}

struct VisitRow {
    id: String,
    patient_id: String,
    doctor_id: String,
    patient_name: String,
    visit_date: Option<String>,
    symptoms: Option<String>,
    diagnosis: Option<String>,
    medicines: String,
    notes: Option<String>,
    needs_follow_up: i32,
    follow_up_date: Option<String>,
    follow_up_reason: Option<String>,
    follow_up_completed: i32,
    follow_up_completed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

fn visit_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<VisitRow, rusqlite::Error> {
    Ok(VisitRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        patient_name: row.get(3)?,
        visit_date: row.get(4)?,
        symptoms: row.get(5)?,
        diagnosis: row.get(6)?,
        medicines: row.get(7)?,
        notes: row.get(8)?,
        needs_follow_up: row.get(9)?,
        follow_up_date: row.get(10)?,
        follow_up_reason: row.get(11)?,
        follow_up_completed: row.get(12)?,
        follow_up_completed_at: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn visit_from_row(row: VisitRow) -> Result<Visit, DatabaseError> {
    let medicines: Vec<Medicine> = serde_json::from_str(&row.medicines)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("medicines: {e}")))?;
    Ok(Visit {
        id: uuid_from_sql(&row.id)?,
        patient_id: uuid_from_sql(&row.patient_id)?,
        doctor_id: uuid_from_sql(&row.doctor_id)?,
        patient_name: row.patient_name,
        visit_date: row.visit_date.as_deref().map(timestamp_from_sql).transpose()?,
        symptoms: row.symptoms,
        diagnosis: row.diagnosis,
        medicines,
        notes: row.notes,
        needs_follow_up: row.needs_follow_up != 0,
        follow_up_date: row.follow_up_date.as_deref().map(date_from_sql).transpose()?,
        follow_up_reason: row.follow_up_reason,
        follow_up_completed: row.follow_up_completed != 0,
        follow_up_completed_at: row
            .follow_up_completed_at
            .as_deref()
            .map(timestamp_from_sql)
            .transpose()?,
        created_at: timestamp_from_sql(&row.created_at)?,
        updated_at: timestamp_from_sql(&row.updated_at)?,
    })
}

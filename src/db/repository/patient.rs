use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{timestamp_from_sql, timestamp_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "id, doctor_id, name, age, gender, contact, address, blood_group,
     emergency_contact, medical_history, created_at, updated_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, doctor_id, name, age, gender, contact, address, blood_group,
         emergency_contact, medical_history, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient.id.to_string(),
            patient.doctor_id.to_string(),
            patient.name,
            patient.age,
            patient.gender.as_str(),
            patient.contact,
            patient.address,
            patient.blood_group.map(|b| b.as_str()),
            patient.emergency_contact,
            patient.medical_history,
            timestamp_to_sql(&patient.created_at),
            timestamp_to_sql(&patient.updated_at),
        ],
    )?;
    Ok(())
}

/// Fetch a patient by id regardless of owner. Callers check `doctor_id`.
pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], patient_row_from_rusqlite)
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// All of a doctor's patients, newest first.
pub fn list_patients(conn: &Connection, doctor_id: &Uuid) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE doctor_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![doctor_id.to_string()], patient_row_from_rusqlite)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Persist edited fields and propagate a renamed patient to their visits.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let changed = tx.execute(
        "UPDATE patients SET name = ?2, age = ?3, gender = ?4, contact = ?5, address = ?6,
         blood_group = ?7, emergency_contact = ?8, medical_history = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.gender.as_str(),
            patient.contact,
            patient.address,
            patient.blood_group.map(|b| b.as_str()),
            patient.emergency_contact,
            patient.medical_history,
            timestamp_to_sql(&patient.updated_at),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient.id.to_string(),
        });
    }
    tx.execute(
        "UPDATE visits SET patient_name = ?2 WHERE patient_id = ?1",
        params![patient.id.to_string(), patient.name],
    )?;
    tx.commit()?;
    Ok(())
}

/// Delete a patient and every visit recorded for them.
/// Returns the number of visits removed.
pub fn delete_patient_cascade(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let visits = tx.execute(
        "DELETE FROM visits WHERE patient_id = ?1",
        params![id.to_string()],
    )?;
    let changed = tx.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    tx.commit()?;
    Ok(visits)
}

struct PatientRow {
    id: String,
    doctor_id: String,
    name: String,
    age: u32,
    gender: String,
    contact: String,
    address: Option<String>,
    blood_group: Option<String>,
    emergency_contact: Option<String>,
    medical_history: Option<String>,
    created_at: String,
    updated_at: String,
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        contact: row.get(5)?,
        address: row.get(6)?,
        blood_group: row.get(7)?,
        emergency_contact: row.get(8)?,
        medical_history: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: uuid_from_sql(&row.id)?,
        doctor_id: uuid_from_sql(&row.doctor_id)?,
        name: row.name,
        age: row.age,
        gender: Gender::from_str(&row.gender)?,
        contact: row.contact,
        address: row.address,
        blood_group: row
            .blood_group
            .as_deref()
            .map(BloodGroup::from_str)
            .transpose()?,
        emergency_contact: row.emergency_contact,
        medical_history: row.medical_history,
        created_at: timestamp_from_sql(&row.created_at)?,
        updated_at: timestamp_from_sql(&row.updated_at)?,
    })
}

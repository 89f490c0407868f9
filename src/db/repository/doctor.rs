use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{timestamp_from_sql, timestamp_to_sql, uuid_from_sql};
use crate::db::DatabaseError;
use crate::models::Doctor;

const DOCTOR_COLUMNS: &str = "id, name, clinic_name, email, email_verified, password_hash,
     password_salt, verification_token, created_at";

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "INSERT INTO doctors (id, name, clinic_name, email, email_verified, password_hash,
         password_salt, verification_token, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            doctor.id.to_string(),
            doctor.name,
            doctor.clinic_name,
            doctor.email,
            doctor.email_verified as i32,
            doctor.password_hash,
            doctor.password_salt,
            doctor.verification_token,
            timestamp_to_sql(&doctor.created_at),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(DatabaseError::ConstraintViolation(format!(
                "email already registered: {}",
                doctor.email
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id.to_string()], doctor_row_from_rusqlite)
        .optional()?;
    row.map(doctor_from_row).transpose()
}

/// Email lookup is case-insensitive; addresses are stored lower-cased.
pub fn get_doctor_by_email(conn: &Connection, email: &str) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE email = ?1");
    let row = conn
        .query_row(&sql, params![email.trim().to_lowercase()], doctor_row_from_rusqlite)
        .optional()?;
    row.map(doctor_from_row).transpose()
}

pub fn get_doctor_by_verification_token(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<Doctor>, DatabaseError> {
    let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE verification_token = ?1");
    let row = conn
        .query_row(&sql, params![token_hash], doctor_row_from_rusqlite)
        .optional()?;
    row.map(doctor_from_row).transpose()
}

/// Replace (or clear) the pending verification token hash.
pub fn set_verification_token(
    conn: &Connection,
    id: &Uuid,
    token_hash: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET verification_token = ?2 WHERE id = ?1",
        params![id.to_string(), token_hash],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Flag the email as verified and drop any outstanding token.
pub fn mark_email_verified(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE doctors SET email_verified = 1, verification_token = NULL WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct DoctorRow {
    id: String,
    name: String,
    clinic_name: String,
    email: String,
    email_verified: i32,
    password_hash: String,
    password_salt: String,
    verification_token: Option<String>,
    created_at: String,
}

fn doctor_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<DoctorRow, rusqlite::Error> {
    Ok(DoctorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        clinic_name: row.get(2)?,
        email: row.get(3)?,
        email_verified: row.get(4)?,
        password_hash: row.get(5)?,
        password_salt: row.get(6)?,
        verification_token: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: uuid_from_sql(&row.id)?,
        name: row.name,
        clinic_name: row.clinic_name,
        email: row.email,
        email_verified: row.email_verified != 0,
        password_hash: row.password_hash,
        password_salt: row.password_salt,
        verification_token: row.verification_token,
        created_at: timestamp_from_sql(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::make_doctor;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_fetch_doctor() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "asha@example.com");

        let by_id = get_doctor(&conn, &doctor.id).unwrap().unwrap();
        assert_eq!(by_id.email, "asha@example.com");
        assert!(by_id.email_verified);
        assert_eq!(by_id.created_at, doctor.created_at);

        let by_email = get_doctor_by_email(&conn, "  ASHA@example.com ").unwrap();
        assert_eq!(by_email.map(|d| d.id), Some(doctor.id));
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let first = make_doctor(&conn, "dup@example.com");
        let mut second = first.clone();
        second.id = Uuid::new_v4();
        let err = insert_doctor(&conn, &second).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn verification_token_lifecycle() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "token@example.com");

        set_verification_token(&conn, &doctor.id, Some("abc123")).unwrap();
        let found = get_doctor_by_verification_token(&conn, "abc123").unwrap().unwrap();
        assert_eq!(found.id, doctor.id);

        mark_email_verified(&conn, &doctor.id).unwrap();
        assert!(get_doctor_by_verification_token(&conn, "abc123").unwrap().is_none());
    }

    #[test]
    fn missing_doctor_update_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = mark_email_verified(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
        assert!(get_doctor(&conn, &Uuid::new_v4()).unwrap().is_none());
    }
}

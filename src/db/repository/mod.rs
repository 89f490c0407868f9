//! Repository layer: entity-scoped database operations.
//!
//! Every query is scoped by the owning doctor where the table carries a
//! `doctor_id`. Timestamps are stored as RFC 3339 UTC text with fixed
//! millisecond precision so that lexical order equals time order.

mod doctor;
mod patient;
mod visit;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use doctor::*;
pub use patient::*;
pub use visit::*;

pub(crate) fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn timestamp_from_sql(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn date_from_sql(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date {raw:?}: {e}")))
}

pub(crate) fn uuid_from_sql(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        assert!(timestamp_to_sql(&early) < timestamp_to_sql(&late));
        assert_eq!(timestamp_from_sql(&timestamp_to_sql(&late)).unwrap(), late);
    }

    #[test]
    fn bad_stored_values_are_constraint_errors() {
        assert!(matches!(
            timestamp_from_sql("yesterday"),
            Err(DatabaseError::ConstraintViolation(_))
        ));
        assert!(date_from_sql("2026-02-30").is_err());
        assert!(uuid_from_sql("not-a-uuid").is_err());
    }
}

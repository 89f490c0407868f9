//! Dashboard snapshot: fetches a doctor's records and runs the aggregator.

use chrono::{DateTime, TimeZone};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::Patient;
use crate::stats::{self, DashboardStats, FollowUpBoard};

pub const RECENT_PATIENTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub follow_ups: FollowUpBoard,
    pub recent_patients: Vec<Patient>,
}

/// Everything the dashboard page shows for `doctor_id`, as of `now`.
pub fn load_dashboard<Tz: TimeZone>(
    conn: &Connection,
    doctor_id: &Uuid,
    now: &DateTime<Tz>,
) -> Result<DashboardData, DatabaseError> {
    let patients = db::list_patients(conn, doctor_id)?;
    let visits = db::list_visits(conn, doctor_id)?;
    let pending = db::list_pending_follow_ups(conn, doctor_id)?;

    let stats = stats::compute_dashboard_stats(&patients, &visits, now);
    let follow_ups = stats::follow_up_board(&pending, now.date_naive());
    let recent_patients = patients.into_iter().take(RECENT_PATIENTS).collect();

    tracing::debug!(
        doctor_id = %doctor_id,
        patients = stats.total_patients,
        visits = visits.len(),
        follow_ups = follow_ups.total(),
        "Dashboard computed"
    );

    Ok(DashboardData {
        stats,
        follow_ups,
        recent_patients,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::test_support::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn dashboard_reads_only_own_records() {
        let conn = open_memory_database().unwrap();
        let mine = make_doctor(&conn, "mine@example.com");
        let other = make_doctor(&conn, "other@example.com");
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

        let patient = make_patient(&conn, mine.id, "Kiran", now);
        make_visit(&conn, &patient, now, Some("Flu"));
        let theirs = make_patient(&conn, other.id, "Elsewhere", now);
        make_visit(&conn, &theirs, now, Some("Cold"));

        let data = load_dashboard(&conn, &mine.id, &now).unwrap();
        assert_eq!(data.stats.total_patients, 1);
        assert_eq!(data.stats.visits.today, 1);
        assert_eq!(data.stats.top_diagnoses.entries[0].label, "Flu");
        assert_eq!(data.recent_patients.len(), 1);
    }

    #[test]
    fn dashboard_lists_five_recent_patients_and_follow_ups() {
        let conn = open_memory_database().unwrap();
        let doctor = make_doctor(&conn, "d@example.com");
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let mut last = None;
        for day in 1..=7 {
            let at = Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap();
            last = Some(make_patient(&conn, doctor.id, &format!("P{day}"), at));
        }
        let patient = last.unwrap();
        let mut visit = make_visit(&conn, &patient, now, None);
        visit.needs_follow_up = true;
        visit.follow_up_date = NaiveDate::from_ymd_opt(2026, 3, 14);
        db::update_visit(&conn, &visit).unwrap();

        let data = load_dashboard(&conn, &doctor.id, &now).unwrap();
        let names: Vec<_> = data.recent_patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P7", "P6", "P5", "P4", "P3"]);
        assert_eq!(data.follow_ups.overdue.len(), 1);
        assert_eq!(data.follow_ups.overdue[0].days, 1);
        assert_eq!(data.stats.new_patients_this_month, 7);
    }
}

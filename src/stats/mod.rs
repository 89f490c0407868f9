//! Dashboard statistics aggregator.
//!
//! Pure functions over already-fetched patient and visit snapshots. Nothing
//! here touches the database or the clock: every calendar computation is
//! anchored to the `now` value supplied by the caller and performed in
//! that value's time zone. Empty input degrades to zero counts and
//! `NoData` sentinels, never to a division by zero.

mod demographics;
mod diagnosis;
mod follow_up;
mod monthly;
mod weekday;
mod window;

pub use demographics::*;
pub use diagnosis::*;
pub use follow_up::*;
pub use monthly::*;
pub use weekday::*;
pub use window::*;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Patient, Visit};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / total` as a one-decimal percentage. Zero when `total` is zero.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

/// Calendar day of a stored instant, seen from `tz`.
pub(crate) fn local_day<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Every metric shown on the dashboard, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub visits: VisitWindowCounts,
    pub monthly: MonthlyStats,
    pub new_patients_this_month: usize,
    pub top_diagnoses: DiagnosisRanking,
    pub demographics: Demographics,
    /// Gender shares with at least one patient, as shown on the chart.
    pub visible_gender: Vec<GenderShare>,
}

/// Run every aggregator over a doctor's patients and visits.
pub fn compute_dashboard_stats<Tz: TimeZone>(
    patients: &[Patient],
    visits: &[Visit],
    now: &DateTime<Tz>,
) -> DashboardStats {
    let demographics = demographics(patients);
    DashboardStats {
        total_patients: patients.len(),
        visits: count_visit_windows(visits, now),
        monthly: monthly_stats(visits, now),
        new_patients_this_month: count_new_patients(patients, now),
        top_diagnoses: rank_diagnoses(visits, now),
        visible_gender: demographics.visible_gender().into_iter().cloned().collect(),
        demographics,
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::Gender;

    #[test]
    fn round1_matches_one_decimal() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(-12.55), -12.6);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn dashboard_stats_on_empty_snapshot() {
        let now = local(2026, 3, 15, 12, 0);
        let stats = compute_dashboard_stats(&[], &[], &now);
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.visits.today, 0);
        assert_eq!(stats.visits.last_seven_days, 0);
        assert_eq!(stats.monthly.trend, MonthlyTrend::FirstMonth);
        assert_eq!(stats.monthly.avg_visits_per_day, 0.0);
        assert_eq!(stats.monthly.busiest_day, BusiestDay::NoData);
        assert!(stats.top_diagnoses.entries.is_empty());
        assert_eq!(stats.demographics, Demographics::NoData);
        assert!(stats.visible_gender.is_empty());
    }

    #[test]
    fn dashboard_stats_combines_metrics() {
        let now = local(2026, 3, 15, 12, 0);
        let patients = vec![
            patient(30, Gender::Male, local(2026, 3, 2, 9, 0)),
            patient(60, Gender::Female, local(2026, 1, 2, 9, 0)),
        ];
        let visits = vec![
            visit_at(Some(local(2026, 3, 15, 9, 0)), Some("Flu")),
            visit_at(Some(local(2026, 2, 10, 9, 0)), Some("Cold")),
        ];
        let stats = compute_dashboard_stats(&patients, &visits, &now);
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.visits.today, 1);
        assert_eq!(stats.new_patients_this_month, 1);
        assert_eq!(stats.monthly.this_month, 1);
        assert_eq!(stats.monthly.last_month, 1);
        assert_eq!(stats.top_diagnoses.window_visits, 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["monthly"]["trend"]["kind"], "change");
        assert_eq!(json["demographics"]["kind"], "distribution");
        assert_eq!(json["monthly"]["trend_label"], "Same as last month");
        let visible: Vec<_> = stats.visible_gender.iter().map(|g| g.gender).collect();
        assert_eq!(visible, vec![Gender::Male, Gender::Female]);
        assert_eq!(json["visible_gender"].as_array().unwrap().len(), 2);
    }
}

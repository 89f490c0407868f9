use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use super::{busiest_weekday, local_day, round1, BusiestDay};
use crate::models::{Patient, Visit};

/// Sign of the month-over-month change after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    /// CSS class used by the dashboard card.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Up => "trend-up",
            Self::Down => "trend-down",
            Self::Flat => "trend-neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonthlyTrend {
    /// Previous month had no visits, so there is nothing to compare against.
    FirstMonth,
    Change { percent: f64, direction: TrendDirection },
}

impl MonthlyTrend {
    pub fn between(this_month: usize, last_month: usize) -> Self {
        if last_month == 0 {
            return Self::FirstMonth;
        }
        let percent = round1((this_month as f64 - last_month as f64) / last_month as f64 * 100.0);
        let direction = if percent > 0.0 {
            TrendDirection::Up
        } else if percent < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Flat
        };
        // normalise -0.0
        let percent = if direction == TrendDirection::Flat { 0.0 } else { percent };
        Self::Change { percent, direction }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::FirstMonth => "trend-neutral",
            Self::Change { direction, .. } => direction.tag(),
        }
    }

    /// Short text for the trend badge.
    pub fn label(&self) -> String {
        match self {
            Self::FirstMonth => "First month of data".to_string(),
            Self::Change { percent, direction } => match direction {
                TrendDirection::Up => format!("+{percent}% vs last month"),
                TrendDirection::Down => format!("{percent}% vs last month"),
                TrendDirection::Flat => "Same as last month".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub this_month: usize,
    pub last_month: usize,
    pub trend: MonthlyTrend,
    pub trend_tag: &'static str,
    pub trend_label: String,
    pub avg_visits_per_day: f64,
    pub busiest_day: BusiestDay,
}

/// Visits of the current and the preceding local calendar month.
pub struct MonthPartition<'a> {
    pub this_month: Vec<&'a Visit>,
    pub last_month: Vec<&'a Visit>,
}

pub(crate) fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn previous_month_start(day: NaiveDate) -> NaiveDate {
    let first = month_start(day);
    first
        .pred_opt()
        .map(month_start)
        .unwrap_or(first)
}

pub fn partition_months<'a, Tz: TimeZone>(visits: &'a [Visit], now: &DateTime<Tz>) -> MonthPartition<'a> {
    let tz = now.timezone();
    let this_start = month_start(now.date_naive());
    let last_start = previous_month_start(now.date_naive());

    let mut partition = MonthPartition {
        this_month: Vec::new(),
        last_month: Vec::new(),
    };
    for visit in visits {
        let Some(at) = visit.visit_date.as_ref() else {
            continue;
        };
        let day = month_start(local_day(at, &tz));
        if day == this_start {
            partition.this_month.push(visit);
        } else if day == last_start {
            partition.last_month.push(visit);
        }
    }
    partition
}

/// Month-over-month comparison, daily average and busiest weekday.
pub fn monthly_stats<Tz: TimeZone>(visits: &[Visit], now: &DateTime<Tz>) -> MonthlyStats {
    let partition = partition_months(visits, now);
    let this_month = partition.this_month.len();
    let last_month = partition.last_month.len();
    let trend = MonthlyTrend::between(this_month, last_month);
    let day_of_month = now.day().max(1);

    MonthlyStats {
        this_month,
        last_month,
        trend,
        trend_tag: trend.tag(),
        trend_label: trend.label(),
        avg_visits_per_day: round1(this_month as f64 / day_of_month as f64),
        busiest_day: busiest_weekday(&partition.this_month, &now.timezone()),
    }
}

/// Patients created on or after the first instant of the current local month.
pub fn count_new_patients<Tz: TimeZone>(patients: &[Patient], now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let start = month_start(now.date_naive());
    patients
        .iter()
        .filter(|p| local_day(&p.created_at, &tz) >= start)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::stats::fixtures::*;

    fn visits_on(dates: &[(i32, u32, u32)]) -> Vec<Visit> {
        dates
            .iter()
            .map(|&(y, m, d)| visit_at(Some(local(y, m, d, 10, 0)), None))
            .collect()
    }

    #[test]
    fn first_month_when_previous_empty() {
        let now = local(2026, 3, 10, 12, 0);
        let stats = monthly_stats(&visits_on(&[(2026, 3, 1), (2026, 3, 2)]), &now);
        assert_eq!(stats.this_month, 2);
        assert_eq!(stats.last_month, 0);
        assert_eq!(stats.trend, MonthlyTrend::FirstMonth);
        assert_eq!(stats.trend_tag, "trend-neutral");
        assert_eq!(stats.trend_label, "First month of data");
    }

    #[test]
    fn trend_up_down_and_flat() {
        assert_eq!(
            MonthlyTrend::between(3, 2),
            MonthlyTrend::Change { percent: 50.0, direction: TrendDirection::Up }
        );
        assert_eq!(
            MonthlyTrend::between(1, 3),
            MonthlyTrend::Change { percent: -66.7, direction: TrendDirection::Down }
        );
        let flat = MonthlyTrend::between(4, 4);
        assert_eq!(
            flat,
            MonthlyTrend::Change { percent: 0.0, direction: TrendDirection::Flat }
        );
        assert_eq!(flat.tag(), "trend-neutral");
        assert_eq!(MonthlyTrend::between(0, 5).tag(), "trend-down");
        assert_eq!(MonthlyTrend::between(7, 0), MonthlyTrend::FirstMonth);
    }

    #[test]
    fn tiny_change_rounds_to_flat() {
        // +0.005% rounds to zero
        let trend = MonthlyTrend::between(20001, 20000);
        assert_eq!(
            trend,
            MonthlyTrend::Change { percent: 0.0, direction: TrendDirection::Flat }
        );
    }

    #[test]
    fn month_boundaries_use_local_calendar() {
        let now = local(2026, 3, 10, 12, 0);
        let visits = vec![
            visit_at(Some(local(2026, 3, 1, 0, 0)), None),
            visit_at(Some(local(2026, 2, 28, 23, 59)), None),
            visit_at(Some(local(2026, 2, 1, 0, 0)), None),
            visit_at(Some(local(2026, 1, 31, 23, 59)), None),
            visit_at(None, None),
        ];
        let stats = monthly_stats(&visits, &now);
        assert_eq!(stats.this_month, 1);
        assert_eq!(stats.last_month, 2);
    }

    #[test]
    fn january_compares_against_december() {
        let now = local(2026, 1, 5, 12, 0);
        let stats = monthly_stats(&visits_on(&[(2026, 1, 2), (2025, 12, 20), (2025, 12, 21)]), &now);
        assert_eq!(stats.this_month, 1);
        assert_eq!(stats.last_month, 2);
        assert_eq!(
            stats.trend,
            MonthlyTrend::Change { percent: -50.0, direction: TrendDirection::Down }
        );
    }

    #[test]
    fn average_divides_by_day_of_month() {
        let now = local(2026, 3, 3, 12, 0);
        let stats = monthly_stats(&visits_on(&[(2026, 3, 1), (2026, 3, 2), (2026, 3, 2), (2026, 3, 3)]), &now);
        assert_eq!(stats.avg_visits_per_day, 1.3);
    }

    #[test]
    fn trend_labels() {
        assert_eq!(MonthlyTrend::between(3, 2).label(), "+50% vs last month");
        assert_eq!(MonthlyTrend::between(1, 2).label(), "-50% vs last month");
        assert_eq!(MonthlyTrend::between(4, 4).label(), "Same as last month");
        assert_eq!(MonthlyTrend::FirstMonth.label(), "First month of data");
    }

    #[test]
    fn new_patients_boundary_is_inclusive() {
        let now = local(2026, 3, 20, 12, 0);
        let patients = vec![
            patient(30, Gender::Male, local(2026, 3, 1, 0, 0)),
            patient(30, Gender::Male, local(2026, 2, 28, 23, 59)),
            patient(30, Gender::Male, local(2026, 3, 19, 8, 0)),
        ];
        assert_eq!(count_new_patients(&patients, &now), 2);
    }
}

use chrono::{DateTime, Duration, TimeZone};
use serde::Serialize;

use super::local_day;
use crate::models::Visit;

/// Visits today and in the trailing seven local days (today included).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitWindowCounts {
    pub today: usize,
    pub last_seven_days: usize,
}

/// Count visits by local calendar day. Undated visits are ignored.
pub fn count_visit_windows<Tz: TimeZone>(visits: &[Visit], now: &DateTime<Tz>) -> VisitWindowCounts {
    let tz = now.timezone();
    let today = now.date_naive();
    let week_start = today - Duration::days(6);

    let mut counts = VisitWindowCounts::default();
    for day in visits
        .iter()
        .filter_map(|v| v.visit_date.as_ref())
        .map(|at| local_day(at, &tz))
    {
        if day == today {
            counts.today += 1;
        }
        if day >= week_start && day <= today {
            counts.last_seven_days += 1;
        }
    }
    counts
}

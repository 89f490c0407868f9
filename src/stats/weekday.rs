use chrono::{Datelike, TimeZone};
use serde::Serialize;

use crate::models::Visit;

/// Sunday-first, matching the bucket index order.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusiestDay {
    NoData,
    Day {
        /// 0 = Sunday .. 6 = Saturday
        index: u8,
        name: &'static str,
        count: usize,
    },
}

/// Weekday with the most visits. Ties go to the earliest day of the week.
pub fn busiest_weekday<Tz: TimeZone>(visits: &[&Visit], tz: &Tz) -> BusiestDay {
    let mut buckets = [0usize; 7];
    for at in visits.iter().filter_map(|v| v.visit_date.as_ref()) {
        let index = at.with_timezone(tz).weekday().num_days_from_sunday() as usize;
        buckets[index] += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (index, &count) in buckets.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((index, count)),
        }
    }

    match best {
        None => BusiestDay::NoData,
        Some((index, count)) => BusiestDay::Day {
            index: index as u8,
            name: WEEKDAY_NAMES[index],
            count,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::*;

    #[test]
    fn ties_prefer_sunday() {
        // 2026-03-01 is a Sunday, 2026-03-04 a Wednesday
        let visits: Vec<_> = [1, 1, 1, 4, 4, 4]
            .iter()
            .map(|&d| visit_at(Some(local(2026, 3, d, 10, 0)), None))
            .collect();
        let refs: Vec<&Visit> = visits.iter().collect();
        assert_eq!(
            busiest_weekday(&refs, &tz()),
            BusiestDay::Day { index: 0, name: "Sunday", count: 3 }
        );
    }

    #[test]
    fn highest_bucket_wins() {
        let visits: Vec<_> = [2, 4, 11, 18]
            .iter()
            .map(|&d| visit_at(Some(local(2026, 3, d, 10, 0)), None))
            .collect();
        let refs: Vec<&Visit> = visits.iter().collect();
        assert_eq!(
            busiest_weekday(&refs, &tz()),
            BusiestDay::Day { index: 3, name: "Wednesday", count: 3 }
        );
    }

    #[test]
    fn weekday_uses_local_time() {
        // Monday 02:00 at +05:30 is still Sunday in UTC
        let visits = vec![visit_at(Some(local(2026, 3, 2, 2, 0)), None)];
        let refs: Vec<&Visit> = visits.iter().collect();
        assert!(matches!(
            busiest_weekday(&refs, &tz()),
            BusiestDay::Day { name: "Monday", .. }
        ));
    }

    #[test]
    fn empty_month_has_no_busiest_day() {
        assert_eq!(busiest_weekday(&[], &tz()), BusiestDay::NoData);
        let undated = vec![visit_at(None, None)];
        let refs: Vec<&Visit> = undated.iter().collect();
        assert_eq!(busiest_weekday(&refs, &tz()), BusiestDay::NoData);
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Months, TimeZone, Utc};
use serde::Serialize;

use super::percentage;
use crate::models::Visit;

pub const TOP_DIAGNOSES: usize = 5;
pub const DIAGNOSIS_WINDOW_MONTHS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisEntry {
    /// Normalised text with the first letter upper-cased.
    pub label: String,
    pub normalized: String,
    pub count: usize,
    /// Share of all visits in the window, including undiagnosed ones.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisRanking {
    /// Dated visits inside the window; the percentage denominator.
    pub window_visits: usize,
    pub entries: Vec<DiagnosisEntry>,
}

pub fn normalize_diagnosis(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Most frequent diagnoses over the trailing three calendar months.
///
/// Ties keep first-encountered order. The percentage denominator is every
/// visit in the window, so entries need not sum to 100.
pub fn rank_diagnoses<Tz: TimeZone>(visits: &[Visit], now: &DateTime<Tz>) -> DiagnosisRanking {
    let cutoff: Option<DateTime<Utc>> = now
        .clone()
        .checked_sub_months(Months::new(DIAGNOSIS_WINDOW_MONTHS))
        .map(|c| c.with_timezone(&Utc));

    let mut window_visits = 0;
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for visit in visits {
        let Some(at) = visit.visit_date else {
            continue;
        };
        if cutoff.is_some_and(|c| at < c) {
            continue;
        }
        window_visits += 1;

        let Some(normalized) = visit
            .diagnosis
            .as_deref()
            .map(normalize_diagnosis)
            .filter(|d| !d.is_empty())
        else {
            continue;
        };
        let count = counts.entry(normalized.clone()).or_insert(0);
        if *count == 0 {
            order.push(normalized);
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|d| {
            let count = counts.get(&d).copied().unwrap_or(0);
            (d, count)
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_DIAGNOSES);

    DiagnosisRanking {
        window_visits,
        entries: ranked
            .into_iter()
            .map(|(normalized, count)| DiagnosisEntry {
                label: capitalize(&normalized),
                percentage: percentage(count, window_visits),
                normalized,
                count,
            })
            .collect(),
    }
}

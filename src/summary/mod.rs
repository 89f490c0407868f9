//! AI-generated patient summaries.
//!
//! The prompt is built from demographics and the full visit history, sent
//! to a [`SummaryClient`], and the markdown answer is returned alongside a
//! display-ready HTML rendering.

mod format;
mod gemini;
mod prompt;

pub use format::*;
pub use gemini::*;
pub use prompt::*;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Patient, Visit};

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("No visits recorded for this patient")]
    NoVisits,

    #[error("AI summaries are not configured (set CLINIC_DESK_GEMINI_API_KEY)")]
    NotConfigured,

    #[error("Cannot reach the AI service at {0}")]
    Connection(String),

    #[error("AI service returned an error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Failed to parse AI response: {0}")]
    ResponseParsing(String),

    #[error("AI service returned an empty summary")]
    EmptyResponse,
}

/// Text generation backend.
pub trait SummaryClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Stand-in used when no API key is configured.
pub struct UnconfiguredClient;

impl SummaryClient for UnconfiguredClient {
    fn generate(&self, _prompt: &str) -> Result<String, SummaryError> {
        Err(SummaryError::NotConfigured)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub visit_count: usize,
    pub markdown: String,
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

/// Summarise a patient's history. Requires at least one visit.
pub fn summarize_patient<Tz: TimeZone>(
    client: &dyn SummaryClient,
    patient: &Patient,
    visits: &[Visit],
    now: &DateTime<Tz>,
) -> Result<PatientSummary, SummaryError>
where
    Tz::Offset: std::fmt::Display,
{
    if visits.is_empty() {
        return Err(SummaryError::NoVisits);
    }

    let prompt = build_summary_prompt(patient, visits, &now.timezone());
    let start = std::time::Instant::now();
    let markdown = client.generate(&prompt).map_err(|e| {
        tracing::warn!(patient_id = %patient.id, error = %e, "Summary generation failed");
        e
    })?;
    tracing::info!(
        patient_id = %patient.id,
        visits = visits.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Patient summary generated"
    );

    Ok(PatientSummary {
        patient_id: patient.id,
        visit_count: visits.len(),
        html: summary_to_html(&markdown),
        markdown,
        generated_at: now.with_timezone(&Utc),
    })
}

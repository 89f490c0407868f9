use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prescribed medicine line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub duration: String,
}

impl Medicine {
    /// "Paracetamol - 500mg for 5 days", omitting empty parts.
    pub fn describe(&self) -> String {
        let mut text = self.name.clone();
        if !self.dosage.is_empty() {
            text.push_str(" - ");
            text.push_str(&self.dosage);
        }
        if !self.duration.is_empty() {
            text.push_str(" for ");
            text.push_str(&self.duration);
        }
        text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub visit_date: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub medicines: Vec<Medicine>,
    pub notes: Option<String>,
    pub needs_follow_up: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_reason: Option<String>,
    pub follow_up_completed: bool,
    pub follow_up_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw add/edit visit form. Date and time are local wall-clock values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitForm {
    pub visit_date: String, // YYYY-MM-DD
    pub visit_time: String, // HH:MM
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub needs_follow_up: bool,
    #[serde(default)]
    pub follow_up_date: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub follow_up_reason: Option<String>,
}

/// Validated visit fields, produced by `validation::validate_visit`.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitFields {
    pub visit_date: DateTime<Utc>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub medicines: Vec<Medicine>,
    pub notes: Option<String>,
    pub needs_follow_up: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_reason: Option<String>,
}

impl Visit {
    pub fn new(
        doctor_id: Uuid,
        patient_id: Uuid,
        patient_name: &str,
        fields: VisitFields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            patient_name: patient_name.to_string(),
            visit_date: Some(fields.visit_date),
            symptoms: fields.symptoms,
            diagnosis: fields.diagnosis,
            medicines: fields.medicines,
            notes: fields.notes,
            needs_follow_up: fields.needs_follow_up,
            follow_up_date: fields.follow_up_date,
            follow_up_reason: fields.follow_up_reason,
            follow_up_completed: false,
            follow_up_completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields. Completion state is kept unless the
    /// follow-up was switched off.
    pub fn apply(&mut self, fields: VisitFields, now: DateTime<Utc>) {
        self.visit_date = Some(fields.visit_date);
        self.symptoms = fields.symptoms;
        self.diagnosis = fields.diagnosis;
        self.medicines = fields.medicines;
        self.notes = fields.notes;
        self.needs_follow_up = fields.needs_follow_up;
        self.follow_up_date = fields.follow_up_date;
        self.follow_up_reason = fields.follow_up_reason;
        if !self.needs_follow_up {
            self.follow_up_completed = false;
            self.follow_up_completed_at = None;
        }
        self.updated_at = now;
    }

    /// Follow-up requested, dated, and not yet marked done.
    pub fn is_pending_follow_up(&self) -> bool {
        self.needs_follow_up && !self.follow_up_completed && self.follow_up_date.is_some()
    }
}

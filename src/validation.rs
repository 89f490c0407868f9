//! Patient and visit form validation.
//!
//! Turns raw browser forms into typed field sets. The first failing field
//! is reported; messages are shown to the user as-is.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use thiserror::Error;

use crate::models::*;

pub const MAX_AGE: i64 = 150;

static CONTACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trimmed text, or `None` when blank.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn is_valid_contact(contact: &str) -> bool {
    CONTACT_PATTERN.is_match(contact)
}

pub fn validate_patient(form: &PatientForm) -> Result<PatientFields, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Patient name is required"));
    }
    if !(0..=MAX_AGE).contains(&form.age) {
        return Err(ValidationError::new("age", "Please enter a valid age"));
    }
    let gender = Gender::from_str(form.gender.trim())
        .map_err(|_| ValidationError::new("gender", "Please select a gender"))?;
    let contact = form.contact.trim();
    if !is_valid_contact(contact) {
        return Err(ValidationError::new(
            "contact",
            "Please enter a valid 10-digit contact number",
        ));
    }
    let blood_group = optional_text(form.blood_group.as_deref())
        .map(|b| BloodGroup::from_str(&b))
        .transpose()
        .map_err(|_| ValidationError::new("blood_group", "Unknown blood group"))?;

    Ok(PatientFields {
        name: name.to_string(),
        age: form.age as u32,
        gender,
        contact: contact.to_string(),
        address: optional_text(form.address.as_deref()),
        blood_group,
        emergency_contact: optional_text(form.emergency_contact.as_deref()),
        medical_history: optional_text(form.medical_history.as_deref()),
    })
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Validate a visit form whose date and time are wall-clock values in `tz`.
///
/// A requested follow-up needs a date after `today`. When editing, the
/// visit's current follow-up date is accepted unchanged even if it has
/// since passed.
pub fn validate_visit<Tz: TimeZone>(
    form: &VisitForm,
    tz: &Tz,
    today: NaiveDate,
    existing_follow_up: Option<NaiveDate>,
) -> Result<VisitFields, ValidationError> {
    let date = NaiveDate::parse_from_str(form.visit_date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::new("visit_date", "Please enter a valid visit date"))?;
    let time = parse_time(form.visit_time.trim())
        .ok_or_else(|| ValidationError::new("visit_time", "Please enter a valid visit time"))?;
    let visit_date = tz
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::new("visit_time", "That time does not exist on this date"))?;

    let medicines = form
        .medicines
        .iter()
        .filter(|m| !m.name.trim().is_empty())
        .map(|m| Medicine {
            name: m.name.trim().to_string(),
            dosage: m.dosage.trim().to_string(),
            duration: m.duration.trim().to_string(),
        })
        .collect();

    let (follow_up_date, follow_up_reason) = if form.needs_follow_up {
        let raw = optional_text(form.follow_up_date.as_deref())
            .ok_or_else(|| ValidationError::new("follow_up_date", "Please select a follow-up date"))?;
        let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| ValidationError::new("follow_up_date", "Please select a valid follow-up date"))?;
        if date <= today && Some(date) != existing_follow_up {
            return Err(ValidationError::new(
                "follow_up_date",
                "Follow-up date must be in the future",
            ));
        }
        (Some(date), optional_text(form.follow_up_reason.as_deref()))
    } else {
        (None, None)
    };

    Ok(VisitFields {
        visit_date,
        symptoms: optional_text(form.symptoms.as_deref()),
        diagnosis: optional_text(form.diagnosis.as_deref()),
        medicines,
        notes: optional_text(form.notes.as_deref()),
        needs_follow_up: form.needs_follow_up,
        follow_up_date,
        follow_up_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn patient_form() -> PatientForm {
        PatientForm {
            name: "  Meera Iyer ".into(),
            age: 34,
            gender: "Female".into(),
            contact: "9876543210".into(),
            address: Some("   ".into()),
            blood_group: Some("B+".into()),
            emergency_contact: None,
            medical_history: Some(" Asthma ".into()),
        }
    }

    fn visit_form() -> VisitForm {
        VisitForm {
            visit_date: "2026-03-15".into(),
            visit_time: "09:30".into(),
            symptoms: Some("Fever".into()),
            diagnosis: Some(" Viral fever ".into()),
            medicines: vec![
                Medicine { name: "Paracetamol".into(), dosage: "500mg".into(), duration: "3 days".into() },
                Medicine { name: "   ".into(), dosage: "x".into(), duration: "y".into() },
            ],
            notes: None,
            needs_follow_up: false,
            follow_up_date: Some("2026-03-20".into()),
            follow_up_reason: Some("Review".into()),
        }
    }

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn valid_patient_is_trimmed() {
        let fields = validate_patient(&patient_form()).unwrap();
        assert_eq!(fields.name, "Meera Iyer");
        assert_eq!(fields.address, None);
        assert_eq!(fields.blood_group, Some(BloodGroup::BPositive));
        assert_eq!(fields.medical_history.as_deref(), Some("Asthma"));
    }

    #[test]
    fn contact_must_be_ten_digits() {
        for bad in ["12345", "98765432101", "98765-4321", "abcdefghij", ""] {
            let mut form = patient_form();
            form.contact = bad.into();
            assert_eq!(validate_patient(&form).unwrap_err().field, "contact", "{bad}");
        }
    }

    #[test]
    fn patient_required_fields() {
        let mut form = patient_form();
        form.name = " ".into();
        assert_eq!(validate_patient(&form).unwrap_err().field, "name");

        let mut form = patient_form();
        form.age = -1;
        assert_eq!(validate_patient(&form).unwrap_err().field, "age");

        let mut form = patient_form();
        form.gender = "unknown".into();
        assert_eq!(validate_patient(&form).unwrap_err().field, "gender");

        let mut form = patient_form();
        form.blood_group = Some("Z".into());
        assert_eq!(validate_patient(&form).unwrap_err().field, "blood_group");
    }

    #[test]
    fn visit_time_is_local() {
        let fields = validate_visit(&visit_form(), &ist(), today(), None).unwrap();
        assert_eq!(
            fields.visit_date,
            Utc.with_ymd_and_hms(2026, 3, 15, 4, 0, 0).unwrap()
        );
        assert_eq!(fields.diagnosis.as_deref(), Some("Viral fever"));
    }

    #[test]
    fn empty_medicine_rows_are_dropped() {
        let fields = validate_visit(&visit_form(), &ist(), today(), None).unwrap();
        assert_eq!(fields.medicines.len(), 1);
        assert_eq!(fields.medicines[0].name, "Paracetamol");
    }

    #[test]
    fn follow_up_fields_cleared_when_not_needed() {
        let fields = validate_visit(&visit_form(), &ist(), today(), None).unwrap();
        assert!(!fields.needs_follow_up);
        assert_eq!(fields.follow_up_date, None);
        assert_eq!(fields.follow_up_reason, None);
    }

    #[test]
    fn follow_up_needs_future_date() {
        let mut form = visit_form();
        form.needs_follow_up = true;
        let fields = validate_visit(&form, &ist(), today(), None).unwrap();
        assert_eq!(fields.follow_up_date, NaiveDate::from_ymd_opt(2026, 3, 20));
        assert_eq!(fields.follow_up_reason.as_deref(), Some("Review"));

        form.follow_up_date = Some("2026-03-15".into());
        assert_eq!(
            validate_visit(&form, &ist(), today(), None).unwrap_err().field,
            "follow_up_date"
        );
        // unchanged date on an edit is fine
        assert!(validate_visit(&form, &ist(), today(), Some(today())).is_ok());

        form.follow_up_date = None;
        assert_eq!(
            validate_visit(&form, &ist(), today(), None).unwrap_err().message,
            "Please select a follow-up date"
        );
    }

    #[test]
    fn malformed_date_and_time_rejected() {
        let mut form = visit_form();
        form.visit_date = "15/03/2026".into();
        assert_eq!(validate_visit(&form, &ist(), today(), None).unwrap_err().field, "visit_date");

        let mut form = visit_form();
        form.visit_time = "9.30am".into();
        assert_eq!(validate_visit(&form, &ist(), today(), None).unwrap_err().field, "visit_time");
    }
}

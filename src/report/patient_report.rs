use chrono::{DateTime, NaiveDate, TimeZone};

use super::*;
use crate::models::{DoctorProfile, Patient, Visit};

const INDENT: f32 = 25.0;
const MEDICINE_INDENT: f32 = 30.0;

/// `{Name_With_Underscores}_Medical_Report_{YYYY-MM-DD}.pdf`
pub fn patient_report_filename(patient_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_Medical_Report_{}.pdf",
        filename_stem(patient_name),
        date.format("%Y-%m-%d")
    )
}

fn or_default(value: Option<&str>, fallback: &str) -> String {
    value.unwrap_or(fallback).to_string()
}

pub fn patient_report_layout<Tz: TimeZone>(
    doctor: &DoctorProfile,
    patient: &Patient,
    visits: &[Visit],
    tz: &Tz,
) -> Layout
where
    Tz::Offset: std::fmt::Display,
{
    let mut layout = Layout::new();

    layout
        .line(&doctor.clinic_name, 18.0, true, LEFT_MM)
        .line(format!("Dr. {}", doctor.name), 11.0, false, LEFT_MM)
        .space(4.0)
        .line("Patient Medical Report", 14.0, true, LEFT_MM)
        .space(6.0);

    layout.heading("Patient Information");
    layout
        .field("Name", &patient.name, INDENT)
        .field("Age", &format!("{} years", patient.age), INDENT)
        .field("Gender", patient.gender.as_str(), INDENT)
        .field("Contact", &patient.contact, INDENT)
        .field(
            "Blood Group",
            &or_default(patient.blood_group.map(|b| b.as_str()), "Not specified"),
            INDENT,
        )
        .field("Address", &or_default(patient.address.as_deref(), "Not provided"), INDENT);
    if let Some(emergency) = patient.emergency_contact.as_deref() {
        layout.field("Emergency Contact", emergency, INDENT);
    }
    layout.space(4.0);

    layout.heading("Medical History / Allergies");
    layout.paragraph(
        patient.medical_history.as_deref().unwrap_or("None recorded"),
        10.0,
        INDENT,
    );
    layout.space(4.0);

    let noun = if visits.len() == 1 { "visit" } else { "visits" };
    layout.heading(format!("Visit History ({} {noun})", visits.len()));

    if visits.is_empty() {
        layout.line("No visit records available.", 10.0, false, INDENT);
        return layout;
    }

    for (i, visit) in visits.iter().enumerate() {
        let when = match &visit.visit_date {
            Some(at) => format!("{} at {}", format_date(at, tz), format_time(at, tz)),
            None => "Date not recorded".to_string(),
        };
        layout
            .keep(60.0)
            .space(2.0)
            .line(format!("Visit {} - {when}", i + 1), 11.0, true, LEFT_MM);

        if let Some(symptoms) = visit.symptoms.as_deref() {
            layout.field("Symptoms", symptoms, INDENT);
        }
        layout.field(
            "Diagnosis",
            visit.diagnosis.as_deref().unwrap_or("Not recorded"),
            INDENT,
        );
        if !visit.medicines.is_empty() {
            layout.line("Prescribed Medicines:", 10.0, true, INDENT);
            for (n, medicine) in visit.medicines.iter().enumerate() {
                layout.paragraph(&format!("{}. {}", n + 1, medicine.describe()), 10.0, MEDICINE_INDENT);
            }
        }
        if let Some(notes) = visit.notes.as_deref() {
            layout.field("Notes", notes, INDENT);
        }
        if visit.needs_follow_up {
            if let Some(date) = visit.follow_up_date {
                let mut text = date.format("%-d %b %Y").to_string();
                if let Some(reason) = visit.follow_up_reason.as_deref() {
                    text.push_str(&format!(" ({reason})"));
                }
                if visit.follow_up_completed {
                    text.push_str(" - completed");
                }
                layout.field("Follow-up", &text, INDENT);
            }
        }
        layout.space(3.0);
    }

    layout
}

/// Render the full patient report, footer stamped with `now`'s date.
pub fn generate_patient_report<Tz: TimeZone>(
    doctor: &DoctorProfile,
    patient: &Patient,
    visits: &[Visit],
    now: &DateTime<Tz>,
) -> Result<Vec<u8>, ReportError>
where
    Tz::Offset: std::fmt::Display,
{
    let layout = patient_report_layout(doctor, patient, visits, &now.timezone());
    let pages = paginate(layout.items());
    let generated = now.format("%-d %b %Y").to_string();
    let bytes = render(
        &format!("Medical Report - {}", patient.name),
        &pages,
        |page, total| Some(format!("Generated on {generated} | Page {page} of {total}")),
    )?;
    tracing::debug!(patient_id = %patient.id, pages = pages.len(), visits = visits.len(), "Patient report rendered");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use chrono::{FixedOffset, Utc};
    use uuid::Uuid;

    fn doctor() -> DoctorProfile {
        DoctorProfile {
            id: Uuid::new_v4(),
            name: "Asha Rao".into(),
            clinic_name: "Sunrise Clinic".into(),
            email: "asha@example.com".into(),
        }
    }

    fn patient() -> Patient {
        let created = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        Patient {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            name: "Ravi Kumar".into(),
            age: 45,
            gender: Gender::Male,
            contact: "9876543210".into(),
            address: None,
            blood_group: None,
            emergency_contact: Some("9123456789".into()),
            medical_history: Some("Penicillin allergy".into()),
            created_at: created,
            updated_at: created,
        }
    }

    fn visit(day: u32, diagnosis: Option<&str>) -> Visit {
        let at = Utc.with_ymd_and_hms(2026, 3, day, 4, 30, 0).unwrap();
        Visit {
            id: Uuid::new_v4(),
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            patient_name: "Ravi Kumar".into(),
            visit_date: Some(at),
            symptoms: Some("Fever and cough".into()),
            diagnosis: diagnosis.map(String::from),
            medicines: vec![Medicine {
                name: "Azithromycin".into(),
                dosage: "500mg".into(),
                duration: "3 days".into(),
            }],
            notes: None,
            needs_follow_up: true,
            follow_up_date: NaiveDate::from_ymd_opt(2026, 3, day + 7),
            follow_up_reason: Some("Chest review".into()),
            follow_up_completed: false,
            follow_up_completed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    #[test]
    fn filename_uses_underscored_name_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(
            patient_report_filename("Ravi  Kumar", date),
            "Ravi_Kumar_Medical_Report_2026-03-15.pdf"
        );
    }

    #[test]
    fn layout_shows_defaults_and_visit_details() {
        let layout = patient_report_layout(&doctor(), &patient(), &[visit(2, None)], &ist());
        let texts = layout.texts();
        assert!(texts.contains(&"Dr. Asha Rao"));
        assert!(texts.contains(&"Blood Group: Not specified"));
        assert!(texts.contains(&"Address: Not provided"));
        assert!(texts.contains(&"Emergency Contact: 9123456789"));
        assert!(texts.contains(&"Visit History (1 visit)"));
        assert!(texts.contains(&"Visit 1 - 2 Mar 2026 at 10:00 AM"));
        assert!(texts.contains(&"Diagnosis: Not recorded"));
        assert!(texts.contains(&"1. Azithromycin - 500mg for 3 days"));
        assert!(texts.contains(&"Follow-up: 9 Mar 2026 (Chest review)"));
    }

    #[test]
    fn empty_history_says_so() {
        let layout = patient_report_layout(&doctor(), &patient(), &[], &ist());
        let texts = layout.texts();
        assert!(texts.contains(&"Visit History (0 visits)"));
        assert!(texts.contains(&"No visit records available."));
    }

    #[test]
    fn many_visits_paginate_and_render() {
        let visits: Vec<_> = (1..=20).map(|d| visit(d, Some("Bronchitis"))).collect();
        let layout = patient_report_layout(&doctor(), &patient(), &visits, &ist());
        assert!(paginate(layout.items()).len() > 1);

        let now = ist().with_ymd_and_hms(2026, 3, 21, 12, 0, 0).unwrap();
        let bytes = generate_patient_report(&doctor(), &patient(), &visits, &now).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}

use chrono::{NaiveDate, TimeZone};

use super::*;
use crate::models::{DoctorProfile, Patient, Visit};

const COL_SR: f32 = LEFT_MM;
const COL_NAME: f32 = 32.0;
const COL_DOSAGE: f32 = 100.0;
const COL_DURATION: f32 = 145.0;

pub fn prescription_filename(patient_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_Prescription_{}.pdf",
        filename_stem(patient_name),
        date.format("%Y-%m-%d")
    )
}

fn dash_if_empty(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Clip a table cell so it does not run into the next column.
fn cell(value: &str, max_chars: usize) -> String {
    let value = dash_if_empty(value);
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

/// Push a row of table cells sharing one baseline.
fn table_row(layout: &mut Layout, cells: [(&str, f32); 4], bold: bool) {
    layout.keep(6.0);
    // only the last cell advances the baseline
    for (i, (text, x)) in cells.iter().enumerate() {
        layout.items.push(Item::Text(TextLine {
            text: text.to_string(),
            size: 10.0,
            bold,
            x: *x,
            height: if i == cells.len() - 1 { 6.0 } else { 0.0 },
        }));
    }
}

pub fn prescription_layout<Tz: TimeZone>(
    doctor: &DoctorProfile,
    patient: &Patient,
    visit: &Visit,
    tz: &Tz,
) -> Layout
where
    Tz::Offset: std::fmt::Display,
{
    let mut layout = Layout::new();

    layout
        .line(&doctor.clinic_name, 18.0, true, LEFT_MM)
        .line(format!("Dr. {}", doctor.name), 12.0, true, LEFT_MM)
        .line(&doctor.email, 9.0, false, LEFT_MM)
        .space(4.0)
        .line("-".repeat(95), 8.0, false, LEFT_MM)
        .space(2.0);

    let when = match &visit.visit_date {
        Some(at) => format!("{} at {}", format_date(at, tz), format_time(at, tz)),
        None => "Not recorded".to_string(),
    };
    layout
        .field("Patient Name", &patient.name, LEFT_MM)
        .field(
            "Age / Gender",
            &format!("{} years / {}", patient.age, patient.gender.as_str()),
            LEFT_MM,
        )
        .field("Contact", &patient.contact, LEFT_MM)
        .field("Date", &when, LEFT_MM);
    if let Some(group) = patient.blood_group {
        layout.field("Blood Group", group.as_str(), LEFT_MM);
    }
    layout.space(4.0);

    if let Some(symptoms) = visit.symptoms.as_deref() {
        layout.heading("Chief Complaints / Symptoms");
        layout.paragraph(symptoms, 10.0, LEFT_MM).space(3.0);
    }
    if let Some(diagnosis) = visit.diagnosis.as_deref() {
        layout.heading("Diagnosis");
        layout.paragraph(diagnosis, 10.0, LEFT_MM).space(3.0);
    }

    layout.heading("Prescribed Medicines");
    if visit.medicines.is_empty() {
        layout.line("No medicines prescribed", 10.0, false, LEFT_MM);
    } else {
        table_row(
            &mut layout,
            [
                ("Sr.", COL_SR),
                ("Medicine Name", COL_NAME),
                ("Dosage", COL_DOSAGE),
                ("Duration", COL_DURATION),
            ],
            true,
        );
        for (i, medicine) in visit.medicines.iter().enumerate() {
            let sr = format!("{}.", i + 1);
            let name = cell(&medicine.name, 36);
            let dosage = cell(&medicine.dosage, 24);
            let duration = cell(&medicine.duration, 24);
            table_row(
                &mut layout,
                [
                    (&sr, COL_SR),
                    (&name, COL_NAME),
                    (&dosage, COL_DOSAGE),
                    (&duration, COL_DURATION),
                ],
                false,
            );
        }
    }
    layout.space(3.0);

    if let Some(notes) = visit.notes.as_deref() {
        layout.heading("Additional Notes");
        layout.paragraph(notes, 10.0, LEFT_MM).space(3.0);
    }

    if visit.needs_follow_up {
        if let Some(date) = visit.follow_up_date {
            layout.field("Next follow-up", &date.format("%-d %b %Y").to_string(), LEFT_MM);
        }
    }

    layout
        .keep(30.0)
        .space(20.0)
        .line("______________________", 10.0, false, 140.0)
        .line("Doctor's Signature", 10.0, false, 143.0);

    layout
}

pub fn generate_prescription<Tz: TimeZone>(
    doctor: &DoctorProfile,
    patient: &Patient,
    visit: &Visit,
    tz: &Tz,
) -> Result<Vec<u8>, ReportError>
where
    Tz::Offset: std::fmt::Display,
{
    let layout = prescription_layout(doctor, patient, visit, tz);
    let pages = paginate(layout.items());
    let clinic = doctor.clinic_name.clone();
    render(&format!("Prescription - {}", patient.name), &pages, move |page, total| {
        (total > 1).then(|| format!("{clinic} | Page {page} of {total}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use chrono::Utc;
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
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        Patient {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            name: "Meera Iyer".into(),
            age: 29,
            gender: Gender::Female,
            contact: "9000000000".into(),
            address: None,
            blood_group: Some(BloodGroup::APositive),
            emergency_contact: None,
            medical_history: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn visit(medicines: Vec<Medicine>) -> Visit {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 14, 5, 0).unwrap();
        Visit {
            id: Uuid::new_v4(),
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            patient_name: "Meera Iyer".into(),
            visit_date: Some(at),
            symptoms: Some("Sore throat".into()),
            diagnosis: Some("Pharyngitis".into()),
            medicines,
            notes: Some("Warm saline gargles".into()),
            needs_follow_up: false,
            follow_up_date: None,
            follow_up_reason: None,
            follow_up_completed: false,
            follow_up_completed_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn table_uses_dash_for_missing_cells() {
        let meds = vec![Medicine {
            name: "Lozenges".into(),
            dosage: String::new(),
            duration: "5 days".into(),
        }];
        let layout = prescription_layout(&doctor(), &patient(), &visit(meds), &Utc);
        let texts = layout.texts();
        assert!(texts.contains(&"Medicine Name"));
        assert!(texts.contains(&"Lozenges"));
        assert!(texts.contains(&"-"));
        assert!(texts.contains(&"Date: 15 Mar 2026 at 02:05 PM"));
        assert!(texts.contains(&"Blood Group: A+"));
        assert!(texts.contains(&"Doctor's Signature"));
    }

    #[test]
    fn no_medicines_message() {
        let layout = prescription_layout(&doctor(), &patient(), &visit(Vec::new()), &Utc);
        assert!(layout.texts().contains(&"No medicines prescribed"));
        assert!(!layout.texts().contains(&"Medicine Name"));
    }

    #[test]
    fn long_cells_are_clipped() {
        assert_eq!(cell("abcdefghij", 8), "abcde...");
        assert_eq!(cell("  ", 8), "-");
    }

    #[test]
    fn renders_pdf() {
        let meds = vec![Medicine {
            name: "Amoxicillin".into(),
            dosage: "250mg".into(),
            duration: "7 days".into(),
        }];
        let bytes = generate_prescription(&doctor(), &patient(), &visit(meds), &Utc).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(prescription_filename("Meera Iyer", date), "Meera_Iyer_Prescription_2026-03-15.pdf");
    }
}

use std::fmt::Write;

use chrono::TimeZone;

use crate::models::{Patient, Visit};

pub const SUMMARY_SECTIONS: [&str; 5] = [
    "Patient Overview",
    "Common Health Patterns",
    "Medication History",
    "Key Health Concerns",
    "Recommendations",
];

fn value_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(fallback)
}

/// Build the summary prompt from demographics and visit history.
pub fn build_summary_prompt<Tz: TimeZone>(patient: &Patient, visits: &[Visit], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut prompt = String::new();
    // writeln! into a String cannot fail
    let _ = writeln!(
        prompt,
        "You are a medical assistant helping a doctor review a patient's records. \
         Using the patient information and visit history below, write a concise clinical summary."
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "PATIENT INFORMATION:");
    let _ = writeln!(prompt, "Name: {}", patient.name);
    let _ = writeln!(prompt, "Age: {} years", patient.age);
    let _ = writeln!(prompt, "Gender: {}", patient.gender);
    let _ = writeln!(
        prompt,
        "Blood Group: {}",
        patient.blood_group.map(|b| b.as_str()).unwrap_or("Not specified")
    );
    let _ = writeln!(
        prompt,
        "Medical History: {}",
        value_or(patient.medical_history.as_deref(), "None recorded")
    );
    let _ = writeln!(prompt, "Total Visits: {}", visits.len());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "VISIT HISTORY (most recent first):");

    for (i, visit) in visits.iter().enumerate() {
        let date = visit
            .visit_date
            .map(|at| at.with_timezone(tz).format("%-d %b %Y").to_string())
            .unwrap_or_else(|| "date not recorded".to_string());
        let medicines = if visit.medicines.is_empty() {
            "None".to_string()
        } else {
            visit
                .medicines
                .iter()
                .map(|m| m.describe())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(prompt, "Visit {} ({date}):", i + 1);
        let _ = writeln!(prompt, "- Symptoms: {}", value_or(visit.symptoms.as_deref(), "Not recorded"));
        let _ = writeln!(prompt, "- Diagnosis: {}", value_or(visit.diagnosis.as_deref(), "Not recorded"));
        let _ = writeln!(prompt, "- Medicines: {medicines}");
        let _ = writeln!(prompt, "- Notes: {}", value_or(visit.notes.as_deref(), "None"));
        let _ = writeln!(prompt);
    }

    let _ = writeln!(prompt, "Write the summary with these sections:");
    let guidance = [
        "age, gender and overall health picture",
        "recurring symptoms or diagnoses across visits",
        "medicines prescribed and how they changed",
        "chronic conditions, allergies or anything needing attention",
        "suggested follow-ups, tests or lifestyle advice",
    ];
    for (n, (section, hint)) in SUMMARY_SECTIONS.iter().zip(guidance).enumerate() {
        let _ = writeln!(prompt, "{}. **{section}**: {hint}", n + 1);
    }
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "Keep it between 200 and 300 words, professional, and easy for a doctor to scan."
    );
    prompt
}

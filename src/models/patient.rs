use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{BloodGroup, Gender};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact: String,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw add/edit patient form as submitted by the browser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub contact: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Validated patient fields, produced by `validation::validate_patient`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientFields {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact: String,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
}

impl Patient {
    /// Build a new patient record owned by `doctor_id`.
    pub fn new(doctor_id: Uuid, fields: PatientFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            contact: fields.contact,
            address: fields.address,
            blood_group: fields.blood_group,
            emergency_contact: fields.emergency_contact,
            medical_history: fields.medical_history,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields. `created_at` never changes.
    pub fn apply(&mut self, fields: PatientFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.age = fields.age;
        self.gender = fields.gender;
        self.contact = fields.contact;
        self.address = fields.address;
        self.blood_group = fields.blood_group;
        self.emergency_contact = fields.emergency_contact;
        self.medical_history = fields.medical_history;
        self.updated_at = now;
    }

    /// Upper-cased first letter of the name, used for list avatars.
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

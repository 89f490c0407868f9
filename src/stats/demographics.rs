use serde::Serialize;

use super::percentage;
use crate::models::{Gender, Patient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "0-18")]
    Child,
    #[serde(rename = "19-35")]
    YoungAdult,
    #[serde(rename = "36-50")]
    Adult,
    #[serde(rename = "51-65")]
    MiddleAged,
    #[serde(rename = "65+")]
    Senior,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        Self::Child,
        Self::YoungAdult,
        Self::Adult,
        Self::MiddleAged,
        Self::Senior,
    ];

    /// Upper bounds are inclusive.
    pub fn for_age(age: u32) -> Self {
        if age <= 18 {
            Self::Child
        } else if age <= 35 {
            Self::YoungAdult
        } else if age <= 50 {
            Self::Adult
        } else if age <= 65 {
            Self::MiddleAged
        } else {
            Self::Senior
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Child => "0-18",
            Self::YoungAdult => "19-35",
            Self::Adult => "36-50",
            Self::MiddleAged => "51-65",
            Self::Senior => "65+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderShare {
    pub gender: Gender,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeShare {
    pub bracket: AgeBracket,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Demographics {
    NoData,
    Distribution {
        total: usize,
        gender: Vec<GenderShare>,
        age: Vec<AgeShare>,
    },
}

impl Demographics {
    /// Gender categories with at least one patient.
    pub fn visible_gender(&self) -> Vec<&GenderShare> {
        match self {
            Self::NoData => Vec::new(),
            Self::Distribution { gender, .. } => gender.iter().filter(|g| g.count > 0).collect(),
        }
    }
}

/// Gender and age-bracket distribution of a doctor's patients.
pub fn demographics(patients: &[Patient]) -> Demographics {
    let total = patients.len();
    if total == 0 {
        return Demographics::NoData;
    }

    let gender = Gender::ALL
        .iter()
        .map(|&g| {
            let count = patients.iter().filter(|p| p.gender == g).count();
            GenderShare {
                gender: g,
                count,
                percentage: percentage(count, total),
            }
        })
        .collect();

    let mut age_counts = [0usize; 5];
    for p in patients {
        let bracket = AgeBracket::for_age(p.age);
        if let Some(i) = AgeBracket::ALL.iter().position(|b| *b == bracket) {
            age_counts[i] += 1;
        }
    }
    let age = AgeBracket::ALL
        .iter()
        .zip(age_counts)
        .map(|(&bracket, count)| AgeShare {
            bracket,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    Demographics::Distribution { total, gender, age }
}

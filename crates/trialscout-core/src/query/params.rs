use serde::{Deserialize, Serialize};

use super::expression::SearchTermSet;
use crate::extraction::{Patient, PatientGender};

/// Sex filter supported by the registry: binary or wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchGender {
    Male,
    Female,
    All,
}

impl SearchGender {
    /// Value of the registry `Sex` field.
    pub fn registry_value(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::All => "ALL",
        }
    }
}

impl From<PatientGender> for SearchGender {
    fn from(gender: PatientGender) -> Self {
        match gender {
            PatientGender::Male => Self::Male,
            PatientGender::Female => Self::Female,
            PatientGender::Other | PatientGender::Unknown => Self::All,
        }
    }
}

/// Demographic filter applied to every candidate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPatient {
    pub age: u32,
    pub gender: SearchGender,
}

impl From<&Patient> for SearchPatient {
    fn from(patient: &Patient) -> Self {
        Self {
            age: patient.age,
            gender: patient.gender.into(),
        }
    }
}

/// Everything needed to issue one registry query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub conditions: SearchTermSet,
    pub treatments: SearchTermSet,
    pub outcome_measures: SearchTermSet,
    pub patient: SearchPatient,
}

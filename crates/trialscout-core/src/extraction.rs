//! Structured clinical extraction produced from a doctor/patient conversation.
//!
//! The shapes follow the FHIR R4 resources they are modelled on (Patient,
//! Condition, CarePlan, Goal, MedicationRequest), trimmed to what the search
//! pipeline and its callers read. Optional fields accept `null`.

use serde::{Deserialize, Serialize};

use crate::concept::CodedConcept;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientGender {
    Male,
    Female,
    Other,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: String,
    pub age: u32,
    pub gender: PatientGender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<CodedConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<CodedConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodedConcept>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<CodedConcept>,
    /// The condition itself.
    pub code: CodedConcept,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_site: Option<Vec<CodedConcept>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abatement_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<CodedConcept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub lifecycle_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodedConcept>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<GoalTarget>>,
}

impl Goal {
    /// Outcome measures named by this goal's targets, skipping targets without one.
    pub fn measures(&self) -> impl Iterator<Item = &CodedConcept> {
        self.target
            .iter()
            .flatten()
            .filter_map(|t| t.measure.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub status: String,
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub medication: CodedConcept,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Vec<CodedConcept>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    pub status: String,
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<CodedConcept>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<Vec<MedicationRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Everything extracted from one transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalExtraction {
    pub patient: Patient,
    pub conditions: Vec<Condition>,
    pub care_plans: Vec<CarePlan>,
}

impl ClinicalExtraction {
    /// Goals of all care plans, in plan order.
    pub fn goals(&self) -> impl Iterator<Item = &Goal> {
        self.care_plans.iter().flat_map(|cp| cp.goal.iter().flatten())
    }

    /// Medication requests of all care plans, in plan order.
    pub fn medications(&self) -> impl Iterator<Item = &MedicationRequest> {
        self.care_plans
            .iter()
            .flat_map(|cp| cp.medication.iter().flatten())
    }
}

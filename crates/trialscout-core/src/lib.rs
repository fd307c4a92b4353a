//! # trialscout-core
//!
//! Domain types and query compilation shared by the TrialScout crates.
//!
//! - [`concept`] - coded medical concepts as produced by the extraction step
//! - [`extraction`] - the structured clinical extraction (patient, conditions, care plans)
//! - [`query`] - compilation of coded concepts into registry boolean expressions

pub mod concept;
pub mod extraction;
pub mod query;

pub use concept::{CodedConcept, Coding};
pub use extraction::{
    CarePlan, ClinicalExtraction, Condition, Goal, GoalTarget, MedicationRequest, Patient,
    PatientGender,
};
pub use query::{
    AgeGroup, DEFAULT_OPERATOR, Operator, SearchGender, SearchParams, SearchPatient, SearchTerm,
    SearchTermSet, build_field_expression, build_search_expression, extract_terms,
};

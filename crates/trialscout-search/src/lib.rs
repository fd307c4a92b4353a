//! # trialscout-search
//!
//! Talks to the clinical trial registry and runs the cascading relevance
//! search on top of it.
//!
//! - [`client`] - the registry HTTP contract ([`TrialRegistry`], [`ClinicalTrialsClient`])
//! - [`wire`] - the subset of the registry response schema that is read
//! - [`normalize`] - projection of raw studies into [`ClinicalTrialRecord`]s
//! - [`cascade`] - concurrent fan-out over the relaxation ladder and winner selection

pub mod cascade;
pub mod client;
pub mod error;
pub mod normalize;
pub mod trial;
pub mod wire;

pub use cascade::{CandidateTerms, CascadeMatch, CascadingSearch, Strategy};
pub use client::{
    CLINICAL_TRIALS_API_BASE_URL, ClinicalTrialsClient, SearchOptions, TrialRegistry,
    registry_query,
};
pub use error::{CandidateFailure, CascadeError, RegistryError};
pub use normalize::normalize;
pub use trial::{
    ClinicalTrialRecord, ContactInfo, Eligibility, Intervention, Location, SearchResult,
};
pub use wire::RawApiResponse;

//! Error types for registry access and cascading search.

use crate::cascade::Strategy;

/// A registry call failed. Never retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The request could not be sent or the connection failed (includes timeouts).
    #[error("Failed to search clinical trials: {0}")]
    Network(String),

    /// The registry answered with a non-success status.
    #[error("Failed to search clinical trials: HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text, possibly empty.
        body: String,
    },

    /// The response body was not a valid registry document.
    #[error("Failed to search clinical trials: malformed response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used.
    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),
}

/// A failed candidate search within one cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub strategy: Strategy,
    pub message: String,
}

/// Errors surfaced by a cascade run as a whole.
#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    /// Every candidate search failed; nothing can be selected.
    #[error("All {} candidate searches failed: {}", failures.len(), summarize(failures))]
    AllCandidatesFailed { failures: Vec<CandidateFailure> },
}

fn summarize(failures: &[CandidateFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.strategy, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

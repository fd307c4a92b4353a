//! Cascading relevance search.
//!
//! One run derives four candidate queries of decreasing specificity (the
//! relaxation ladder), dispatches all of them concurrently and, once every
//! candidate has finished, picks the most specific one that matched.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use trialscout_core::{
    ClinicalExtraction, DEFAULT_OPERATOR, SearchParams, SearchPatient, SearchTermSet, extract_terms,
};

use crate::client::{SearchOptions, TrialRegistry};
use crate::error::{CandidateFailure, CascadeError};
use crate::normalize::normalize;
use crate::trial::SearchResult;

/// One rung of the relaxation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Conditions, outcome measures and treatments.
    Full,
    ConditionsAndTreatments,
    ConditionsAndOutcomes,
    ConditionsOnly,
}

impl Strategy {
    /// Candidates from most to least specific; selection follows this order.
    pub const LADDER: [Strategy; 4] = [
        Strategy::Full,
        Strategy::ConditionsAndTreatments,
        Strategy::ConditionsAndOutcomes,
        Strategy::ConditionsOnly,
    ];

    pub fn uses_outcomes(&self) -> bool {
        matches!(self, Self::Full | Self::ConditionsAndOutcomes)
    }

    pub fn uses_treatments(&self) -> bool {
        matches!(self, Self::Full | Self::ConditionsAndTreatments)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ConditionsAndTreatments => "conditions_and_treatments",
            Self::ConditionsAndOutcomes => "conditions_and_outcomes",
            Self::ConditionsOnly => "conditions_only",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search terms derived once per extraction and shared by all candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateTerms {
    pub conditions: Vec<String>,
    pub outcomes: Vec<String>,
    pub treatments: Vec<String>,
}

impl CandidateTerms {
    /// Conditions come from each condition's code, outcomes from every goal
    /// target measure and treatments from each medication request.
    pub fn from_extraction(extraction: &ClinicalExtraction) -> Self {
        Self {
            conditions: extraction
                .conditions
                .iter()
                .flat_map(|c| extract_terms(Some(&c.code)))
                .collect(),
            outcomes: extraction
                .goals()
                .flat_map(|g| g.measures())
                .flat_map(|m| extract_terms(Some(m)))
                .collect(),
            treatments: extraction
                .medications()
                .flat_map(|m| extract_terms(Some(&m.medication)))
                .collect(),
        }
    }

    /// Builds the query for one rung. Axes the strategy leaves out are empty;
    /// nothing is ever excluded.
    pub fn params(&self, strategy: Strategy, patient: SearchPatient) -> SearchParams {
        let axis = |used: bool, terms: &[String]| {
            if used {
                SearchTermSet::including(terms.iter().cloned(), DEFAULT_OPERATOR)
            } else {
                SearchTermSet::default()
            }
        };

        SearchParams {
            conditions: axis(true, &self.conditions),
            treatments: axis(strategy.uses_treatments(), &self.treatments),
            outcome_measures: axis(strategy.uses_outcomes(), &self.outcomes),
            patient,
        }
    }
}

/// The selected candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeMatch {
    pub strategy: Strategy,
    pub result: SearchResult,
}

type CandidateOutcome = Result<SearchResult, String>;

/// Runs the relaxation ladder against a registry.
#[derive(Clone)]
pub struct CascadingSearch {
    registry: Arc<dyn TrialRegistry>,
    options: SearchOptions,
    candidate_timeout: Option<Duration>,
}

impl CascadingSearch {
    pub fn new(registry: Arc<dyn TrialRegistry>) -> Self {
        Self {
            registry,
            options: SearchOptions::default(),
            candidate_timeout: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Bounds each candidate search; an elapsed candidate counts as failed.
    #[must_use]
    pub fn with_candidate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.candidate_timeout = timeout;
        self
    }

    /// Searches for trials relevant to `extraction`.
    ///
    /// Returns `Ok(None)` when no candidate reported a match. A failed
    /// candidate is only ineligible; the run fails only when all of them
    /// failed.
    pub async fn run(
        &self,
        extraction: &ClinicalExtraction,
    ) -> Result<Option<CascadeMatch>, CascadeError> {
        let terms = CandidateTerms::from_extraction(extraction);
        self.run_terms(&terms, SearchPatient::from(&extraction.patient))
            .await
    }

    #[instrument(skip_all, fields(
        conditions = terms.conditions.len(),
        outcomes = terms.outcomes.len(),
        treatments = terms.treatments.len(),
    ))]
    pub async fn run_terms(
        &self,
        terms: &CandidateTerms,
        patient: SearchPatient,
    ) -> Result<Option<CascadeMatch>, CascadeError> {
        // Dropping the set aborts whatever is still in flight.
        let mut tasks = JoinSet::new();
        for (slot, strategy) in Strategy::LADDER.into_iter().enumerate() {
            let registry = Arc::clone(&self.registry);
            let options = self.options.clone();
            let timeout = self.candidate_timeout;
            let params = terms.params(strategy, patient);
            tasks.spawn(async move {
                (slot, search_candidate(registry, params, options, timeout).await)
            });
        }

        let mut outcomes: [Option<CandidateOutcome>; 4] = Default::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => outcomes[slot] = Some(outcome),
                Err(e) => warn!(error = %e, "Candidate search task did not complete"),
            }
        }

        select(outcomes)
    }
}

async fn search_candidate(
    registry: Arc<dyn TrialRegistry>,
    params: SearchParams,
    options: SearchOptions,
    timeout: Option<Duration>,
) -> CandidateOutcome {
    let search = registry.search(&params, &options);
    let raw = match timeout {
        Some(limit) => tokio::time::timeout(limit, search)
            .await
            .map_err(|_| format!("timed out after {} ms", limit.as_millis()))?,
        None => search.await,
    };
    raw.map(normalize).map_err(|e| e.to_string())
}

fn select(
    outcomes: [Option<CandidateOutcome>; 4],
) -> Result<Option<CascadeMatch>, CascadeError> {
    let mut failures = Vec::new();
    let mut winner = None;

    for (strategy, outcome) in Strategy::LADDER.into_iter().zip(outcomes) {
        match outcome {
            Some(Ok(result)) => {
                debug!(%strategy, total = ?result.total_count, "Candidate finished");
                if winner.is_none() && result.has_matches() {
                    winner = Some(CascadeMatch { strategy, result });
                }
            }
            Some(Err(message)) => {
                warn!(%strategy, error = %message, "Candidate search failed");
                failures.push(CandidateFailure { strategy, message });
            }
            None => failures.push(CandidateFailure {
                strategy,
                message: "search task aborted".to_string(),
            }),
        }
    }

    if failures.len() == Strategy::LADDER.len() {
        return Err(CascadeError::AllCandidatesFailed { failures });
    }

    match &winner {
        Some(m) => info!(
            strategy = %m.strategy,
            total = ?m.result.total_count,
            "Selected candidate"
        ),
        None => info!("No candidate returned matching trials"),
    }
    Ok(winner)
}

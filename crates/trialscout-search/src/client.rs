//! HTTP contract with the clinical trial registry.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use trialscout_core::{
    AgeGroup, DEFAULT_OPERATOR, Operator, SearchParams, build_field_expression,
    build_search_expression,
};
use url::Url;

use crate::error::RegistryError;
use crate::wire::RawApiResponse;

/// ClinicalTrials.gov API v2. See <https://clinicaltrials.gov/api/v2/docs>.
pub const CLINICAL_TRIALS_API_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// Paging and ordering for one registry query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Ask the registry to compute `totalCount`.
    pub include_total: bool,
    pub page_size: u32,
    pub sort: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_total: true,
            page_size: 5,
            sort: "@relevance".to_string(),
        }
    }
}

/// Something that can run a study search against the registry.
#[async_trait]
pub trait TrialRegistry: Send + Sync {
    async fn search(
        &self,
        params: &SearchParams,
        options: &SearchOptions,
    ) -> Result<RawApiResponse, RegistryError>;
}

/// Builds the registry query parameters for `params`.
///
/// The three axes compile to `query.cond`, `query.intr` and `query.outc`;
/// demographics go into `query.term` as `AREA[StdAge]` and `AREA[Sex]`
/// expressions joined with `AND`. Empty axes are still sent.
pub fn registry_query(
    params: &SearchParams,
    options: &SearchOptions,
) -> Vec<(&'static str, String)> {
    let age_group = AgeGroup::classify(params.patient.age);
    let demographics = [
        build_field_expression(age_group.as_str(), &["StdAge"], Operator::Or),
        build_field_expression(params.patient.gender.registry_value(), &["Sex"], Operator::Or),
    ]
    .join(&format!(" {DEFAULT_OPERATOR} "));

    vec![
        (
            "query.cond",
            build_search_expression(&params.conditions, DEFAULT_OPERATOR),
        ),
        (
            "query.intr",
            build_search_expression(&params.treatments, DEFAULT_OPERATOR),
        ),
        (
            "query.outc",
            build_search_expression(&params.outcome_measures, DEFAULT_OPERATOR),
        ),
        ("query.term", demographics),
        ("countTotal", options.include_total.to_string()),
        ("pageSize", options.page_size.to_string()),
        ("sort", options.sort.clone()),
    ]
}

/// reqwest-backed registry client. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ClinicalTrialsClient {
    http: reqwest::Client,
    studies_url: Url,
}

impl ClinicalTrialsClient {
    /// Creates a client for the registry rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if `base_url` does not parse, or
    /// [`RegistryError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Option<Duration>) -> Result<Self, RegistryError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RegistryError::Network(format!("Failed to create HTTP client: {e}")))?;
        Self::with_http_client(base_url, http)
    }

    /// Creates a client that reuses an existing `reqwest::Client`.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, RegistryError> {
        let studies_url = format!("{}/studies", base_url.trim_end_matches('/'));
        let studies_url = Url::parse(&studies_url)
            .map_err(|e| RegistryError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self { http, studies_url })
    }

    pub fn studies_url(&self) -> &Url {
        &self.studies_url
    }
}

#[async_trait]
impl TrialRegistry for ClinicalTrialsClient {
    #[instrument(skip_all)]
    async fn search(
        &self,
        params: &SearchParams,
        options: &SearchOptions,
    ) -> Result<RawApiResponse, RegistryError> {
        let request = self
            .http
            .get(self.studies_url.clone())
            .header("Accept", "application/json")
            .query(&registry_query(params, options))
            .build()
            .map_err(|e| RegistryError::Network(format!("Failed to build request: {e}")))?;

        debug!(url = %request.url(), "Searching clinical trials");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(error = %e, "Registry request failed");
            RegistryError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Registry returned an error status");
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| RegistryError::Decode(e.to_string()))
    }
}

//! Analyzer backed by an OpenAI-compatible Responses endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use trialscout_core::ClinicalExtraction;
use url::Url;

use super::{
    AnalyzerError, EXTRACTION_INSTRUCTIONS, ModelOverrides, ModelSettings, TranscriptAnalyzer,
    extraction_schema,
};

pub struct OpenAiAnalyzer {
    http: reqwest::Client,
    responses_url: Url,
    api_key: Option<String>,
    defaults: ModelSettings,
    overrides: ModelOverrides,
}

impl OpenAiAnalyzer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, AnalyzerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AnalyzerError::Network(format!("Failed to create HTTP client: {e}")))?;
        let responses_url = format!("{}/responses", base_url.trim_end_matches('/'));
        let responses_url = Url::parse(&responses_url)
            .map_err(|e| AnalyzerError::Network(format!("Invalid analyzer URL {base_url}: {e}")))?;
        Ok(Self {
            http,
            responses_url,
            api_key,
            defaults: ModelSettings::default(),
            overrides: ModelOverrides::default(),
        })
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: ModelOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Settings the next request will use.
    pub fn settings(&self) -> ModelSettings {
        self.defaults.merged(&self.overrides)
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    #[serde(flatten)]
    settings: ModelSettings,
    instructions: &'a str,
    input: &'a str,
    text: TextConfig,
}

#[derive(Debug, Serialize)]
struct TextConfig {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    schema: Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesBody {
    /// Concatenates the text of every `output_text` part of every message item.
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| &item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[async_trait]
impl TranscriptAnalyzer for OpenAiAnalyzer {
    #[instrument(skip_all, fields(dialogue_len = dialogue.len()))]
    async fn analyze(&self, dialogue: &str) -> Result<ClinicalExtraction, AnalyzerError> {
        let body = ResponsesRequest {
            settings: self.settings(),
            instructions: EXTRACTION_INSTRUCTIONS,
            input: dialogue,
            text: TextConfig {
                format: TextFormat {
                    kind: "json_schema",
                    name: "body",
                    schema: extraction_schema(),
                    strict: false,
                },
            },
        };

        let mut request = self.http.post(self.responses_url.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Analyzer request failed");
            AnalyzerError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Analyzer returned an error status");
            return Err(AnalyzerError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ResponsesBody = serde_json::from_str(&text)
            .map_err(|e| AnalyzerError::InvalidExtraction(format!("malformed response: {e}")))?;
        let output = parsed.output_text();
        if output.trim().is_empty() {
            return Err(AnalyzerError::EmptyOutput);
        }
        debug!(output_len = output.len(), "Analyzer returned output text");

        serde_json::from_str(&output).map_err(|e| AnalyzerError::InvalidExtraction(e.to_string()))
    }
}

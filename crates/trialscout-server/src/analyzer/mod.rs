//! Turns a rendered dialogue into a [`ClinicalExtraction`].

mod openai;
mod prompt;
mod schema;

pub use openai::OpenAiAnalyzer;
pub use prompt::EXTRACTION_INSTRUCTIONS;
pub use schema::extraction_schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trialscout_core::ClinicalExtraction;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Failed to analyze transcript: {0}")]
    Network(String),

    #[error("Failed to analyze transcript: HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to analyze transcript: model returned no output text")]
    EmptyOutput,

    #[error("Failed to analyze transcript: invalid extraction: {0}")]
    InvalidExtraction(String),
}

/// Extracts structured clinical data from a doctor/patient dialogue.
#[async_trait]
pub trait TranscriptAnalyzer: Send + Sync {
    async fn analyze(&self, dialogue: &str) -> Result<ClinicalExtraction, AnalyzerError>;
}

/// Model parameters sent with every analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub store: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 1.0,
            store: false,
        }
    }
}

/// Per-deployment overrides; unset fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub store: Option<bool>,
}

impl ModelSettings {
    pub fn merged(&self, overrides: &ModelOverrides) -> ModelSettings {
        ModelSettings {
            model: overrides.model.clone().unwrap_or_else(|| self.model.clone()),
            temperature: overrides.temperature.unwrap_or(self.temperature),
            store: overrides.store.unwrap_or(self.store),
        }
    }
}

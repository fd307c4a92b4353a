//! Read-only transcript fixtures loaded at start-up.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    fn prefix(self) -> &'static str {
        match self {
            Role::Doctor => "D:",
            Role::Patient => "P:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    pub transcript_id: String,
    pub role: Role,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    transcripts: Vec<Transcript>,
    messages: HashMap<String, Vec<Message>>,
}

impl TranscriptStore {
    pub fn new(transcripts: Vec<Transcript>, messages: HashMap<String, Vec<Message>>) -> Self {
        Self {
            transcripts,
            messages,
        }
    }

    /// Loads a transcript array and a `transcriptId -> messages` map.
    pub fn load(
        transcripts_path: impl AsRef<Path>,
        messages_path: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let transcripts = read_json(transcripts_path.as_ref())?;
        let messages = read_json(messages_path.as_ref())?;
        Ok(Self::new(transcripts, messages))
    }

    pub fn list(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn get(&self, id: &str) -> Option<&Transcript> {
        self.transcripts.iter().find(|t| t.id == id)
    }

    pub fn messages(&self, transcript_id: &str) -> Option<&[Message]> {
        self.messages.get(transcript_id).map(Vec::as_slice)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders messages as speaker-prefixed lines (`D:` doctor, `P:` patient).
pub fn render_dialogue(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{} {}", m.role.prefix(), m.body))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Transcript → extraction → cascading trial search.

use std::sync::Arc;

use tracing::{info, instrument};
use trialscout_search::{CascadeError, CascadeMatch, CascadingSearch};

use crate::analyzer::{AnalyzerError, TranscriptAnalyzer};
use crate::transcripts::{TranscriptStore, render_dialogue};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Transcript not found: {0}")]
    TranscriptNotFound(String),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Search(#[from] CascadeError),
}

#[derive(Clone)]
pub struct TranscriptProcessor {
    store: Arc<TranscriptStore>,
    analyzer: Arc<dyn TranscriptAnalyzer>,
    search: CascadingSearch,
}

impl TranscriptProcessor {
    pub fn new(
        store: Arc<TranscriptStore>,
        analyzer: Arc<dyn TranscriptAnalyzer>,
        search: CascadingSearch,
    ) -> Self {
        Self {
            store,
            analyzer,
            search,
        }
    }

    /// Finds trials relevant to the conversation recorded under `id`.
    ///
    /// `Ok(None)` means every candidate search came back without matches.
    #[instrument(skip(self), fields(transcript_id = %id))]
    pub async fn process(&self, id: &str) -> Result<Option<CascadeMatch>, ProcessError> {
        let messages = self
            .store
            .messages(id)
            .ok_or_else(|| ProcessError::TranscriptNotFound(id.to_string()))?;
        let dialogue = render_dialogue(messages);

        let extraction = self.analyzer.analyze(&dialogue).await?;
        info!(
            age = extraction.patient.age,
            gender = ?extraction.patient.gender,
            conditions = extraction.conditions.len(),
            care_plans = extraction.care_plans.len(),
            goals = extraction.goals().count(),
            medications = extraction.medications().count(),
            "Transcript analyzed"
        );

        Ok(self.search.run(&extraction).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use trialscout_core::{ClinicalExtraction, SearchParams};
    use trialscout_search::{RawApiResponse, RegistryError, SearchOptions, Strategy, TrialRegistry};

    use crate::transcripts::{Message, Role};

    struct RecordingAnalyzer {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TranscriptAnalyzer for RecordingAnalyzer {
        async fn analyze(&self, dialogue: &str) -> Result<ClinicalExtraction, AnalyzerError> {
            self.seen.lock().unwrap().push(dialogue.to_string());
            Ok(serde_json::from_value(serde_json::json!({
                "patient": { "name": "Unknown", "age": 39, "gender": "male" },
                "conditions": [{ "code": { "text": "Chest pain" } }],
                "carePlans": []
            }))
            .unwrap())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl TranscriptAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _dialogue: &str) -> Result<ClinicalExtraction, AnalyzerError> {
            Err(AnalyzerError::EmptyOutput)
        }
    }

    struct FixedRegistry(u64);

    #[async_trait]
    impl TrialRegistry for FixedRegistry {
        async fn search(
            &self,
            _params: &SearchParams,
            _options: &SearchOptions,
        ) -> Result<RawApiResponse, RegistryError> {
            let body = serde_json::json!({ "studies": [], "totalCount": self.0 });
            Ok(serde_json::from_value(body).unwrap())
        }
    }

    fn store() -> Arc<TranscriptStore> {
        let messages = vec![
            Message {
                id: 1,
                transcript_id: "t1".into(),
                role: Role::Doctor,
                body: "What brings you in?".into(),
                timestamp: None,
            },
            Message {
                id: 2,
                transcript_id: "t1".into(),
                role: Role::Patient,
                body: "Chest pain.".into(),
                timestamp: None,
            },
        ];
        Arc::new(TranscriptStore::new(
            Vec::new(),
            HashMap::from([("t1".to_string(), messages)]),
        ))
    }

    #[tokio::test]
    async fn analyzes_rendered_dialogue_and_runs_cascade() {
        let analyzer = Arc::new(RecordingAnalyzer {
            seen: Mutex::new(Vec::new()),
        });
        let processor = TranscriptProcessor::new(
            store(),
            analyzer.clone(),
            CascadingSearch::new(Arc::new(FixedRegistry(2))),
        );

        let found = processor.process("t1").await.unwrap().unwrap();
        assert_eq!(found.strategy, Strategy::Full);
        assert_eq!(found.result.total_count, Some(2));
        assert_eq!(
            analyzer.seen.lock().unwrap().as_slice(),
            ["D: What brings you in?\nP: Chest pain."]
        );
    }

    #[tokio::test]
    async fn analyzer_failure_is_propagated() {
        let processor = TranscriptProcessor::new(
            store(),
            Arc::new(FailingAnalyzer),
            CascadingSearch::new(Arc::new(FixedRegistry(5))),
        );
        assert!(matches!(
            processor.process("t1").await,
            Err(ProcessError::Analyzer(AnalyzerError::EmptyOutput))
        ));
    }

    #[tokio::test]
    async fn no_matches_is_none() {
        let processor = TranscriptProcessor::new(
            store(),
            Arc::new(RecordingAnalyzer {
                seen: Mutex::new(Vec::new()),
            }),
            CascadingSearch::new(Arc::new(FixedRegistry(0))),
        );
        assert!(processor.process("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_transcript_is_reported() {
        let processor = TranscriptProcessor::new(
            store(),
            Arc::new(FailingAnalyzer),
            CascadingSearch::new(Arc::new(FixedRegistry(1))),
        );
        let err = processor.process("missing").await.unwrap_err();
        assert!(matches!(err, ProcessError::TranscriptNotFound(ref id) if id == "missing"));
    }
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::info;
use trialscout_search::SearchResult;

use crate::error::ApiError;
use crate::server::AppState;
use crate::transcripts::{Message, Transcript};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/transcripts", get(list_transcripts))
        .route("/transcripts/{id}/messages", get(transcript_messages))
        .route("/transcripts/{id}/process", post(process_transcript))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

async fn list_transcripts(State(state): State<AppState>) -> Json<Vec<Transcript>> {
    Json(state.store.list().to_vec())
}

async fn transcript_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    state
        .store
        .messages(&id)
        .map(|m| Json(m.to_vec()))
        .ok_or(ApiError::NotFound(
            "Messages not found for the given transcript ID",
        ))
}

async fn process_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SearchResult>, ApiError> {
    match state.processor.process(&id).await? {
        Some(found) => {
            info!(transcript_id = %id, strategy = %found.strategy, "Matched clinical trials");
            Ok(Json(found.result))
        }
        None => Err(ApiError::NotFound(
            "No clinical trials found for the given transcript",
        )),
    }
}

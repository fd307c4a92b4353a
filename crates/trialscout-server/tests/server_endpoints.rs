use std::{fs, sync::Arc};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use trialscout_core::ClinicalExtraction;
use trialscout_search::{CascadingSearch, ClinicalTrialsClient};
use trialscout_server::analyzer::{AnalyzerError, TranscriptAnalyzer};
use trialscout_server::config::AppConfig;
use trialscout_server::transcripts::TranscriptStore;
use trialscout_server::{AppState, build_app, build_router};
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRANSCRIPTS: &str = r#"[
  {"id":"t1","title":"Chest pain follow-up","createdAt":"2024-03-01T10:00:00Z","updatedAt":"2024-03-01T10:30:00Z"},
  {"id":"t2","createdAt":"2024-03-02T09:00:00Z","updatedAt":"2024-03-02T09:20:00Z"}
]"#;

const MESSAGES: &str = r#"{
  "t1": [
    {"id":1,"transcriptId":"t1","role":"doctor","body":"What brought you in today?"},
    {"id":2,"transcriptId":"t1","role":"patient","body":"Chest pain, mostly on the left."}
  ],
  "t2": [
    {"id":3,"transcriptId":"t2","role":"doctor","body":"How are you feeling?"}
  ]
}"#;

/// Returns a fixed extraction; fails for dialogues mentioning "feeling".
struct CannedAnalyzer;

#[async_trait]
impl TranscriptAnalyzer for CannedAnalyzer {
    async fn analyze(&self, dialogue: &str) -> Result<ClinicalExtraction, AnalyzerError> {
        if dialogue.contains("feeling") {
            return Err(AnalyzerError::EmptyOutput);
        }
        Ok(serde_json::from_value(json!({
            "patient": { "name": "Unknown", "age": 39, "gender": "male" },
            "conditions": [{ "code": { "coding": [{ "display": "Chest pain" }] } }],
            "carePlans": [{
                "status": "active",
                "intent": "plan",
                "goal": [{ "lifecycleStatus": "active", "target": [{ "measure": { "text": "Pain severity" } }] }],
                "medication": [{ "status": "active", "intent": "order", "medication": { "text": "Aspirin" } }]
            }]
        }))
        .expect("canned extraction"))
    }
}

fn fixtures(dir: &tempfile::TempDir) -> (String, String) {
    let transcripts = dir.path().join("transcripts.json");
    let messages = dir.path().join("messages.json");
    fs::write(&transcripts, TRANSCRIPTS).expect("write transcripts");
    fs::write(&messages, MESSAGES).expect("write messages");
    (
        transcripts.to_string_lossy().into_owned(),
        messages.to_string_lossy().into_owned(),
    )
}

fn page(total: u64, nct_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "studies": [{
            "protocolSection": { "identificationModule": { "nctId": nct_id, "briefTitle": "Study" } }
        }],
        "totalCount": total
    }))
}

async fn start_server(
    app: axum::Router,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

#[tokio::test]
async fn read_endpoints_work_with_configured_app() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let (transcripts_path, messages_path) = fixtures(&dir);
    let mut cfg = AppConfig::default();
    cfg.transcripts.transcripts_path = transcripts_path;
    cfg.transcripts.messages_path = messages_path;

    let app = build_app(&cfg).expect("build app");
    let (base, shutdown_tx, handle) = start_server(app).await;
    let client = reqwest::Client::new();

    // GET /api/health
    let resp = client.get(format!("{base}/api/health")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "message": "Server is running" }));

    // GET /api/transcripts
    let resp = client.get(format!("{base}/api/transcripts")).send().await.unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["id"], "t1");
    assert_eq!(body[0]["createdAt"], "2024-03-01T10:00:00Z");
    assert!(body[1].get("title").is_none());

    // GET /api/transcripts/t1/messages
    let resp = client
        .get(format!("{base}/api/transcripts/t1/messages"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[1]["role"], "patient");
    assert_eq!(body[1]["transcriptId"], "t1");

    // Unknown transcript
    let resp = client
        .get(format!("{base}/api/transcripts/nope/messages"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Messages not found for the given transcript ID");

    // CORS is permissive
    let resp = client
        .get(format!("{base}/api/health"))
        .header("origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn process_endpoint_returns_first_matching_strategy() {
    let registry = MockServer::start().await;
    // Full candidate: nothing
    Mock::given(method("GET"))
        .and(path("/studies"))
        .and(query_param_contains("query.intr", "Aspirin"))
        .and(query_param_contains("query.outc", "Pain severity"))
        .respond_with(page(0, "NCT00000001"))
        .with_priority(1)
        .mount(&registry)
        .await;
    // Conditions + treatments
    Mock::given(method("GET"))
        .and(path("/studies"))
        .and(query_param_contains("query.intr", "Aspirin"))
        .respond_with(page(4, "NCT00000002"))
        .with_priority(2)
        .mount(&registry)
        .await;
    // Everything broader
    Mock::given(method("GET"))
        .and(path("/studies"))
        .respond_with(page(90, "NCT00000003"))
        .with_priority(3)
        .mount(&registry)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let (transcripts_path, messages_path) = fixtures(&dir);
    let store = TranscriptStore::load(&transcripts_path, &messages_path).expect("store");
    let client = ClinicalTrialsClient::new(&registry.uri(), None).expect("registry client");
    let state = AppState::new(
        Arc::new(store),
        Arc::new(CannedAnalyzer),
        CascadingSearch::new(Arc::new(client)),
    );

    let (base, shutdown_tx, handle) = start_server(build_router(state)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/transcripts/t1/process"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["totalCount"], 4);
    assert_eq!(body["studies"][0]["nctId"], "NCT00000002");

    // Analyzer failure surfaces as 500 with a message
    let resp = client
        .post(format!("{base}/api/transcripts/t2/process"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("no output text"));

    // Unknown transcript
    let resp = client
        .post(format!("{base}/api/transcripts/nope/process"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Transcript not found");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn process_endpoint_reports_no_matches_and_registry_outage() {
    let registry = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty/studies"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "studies": [], "totalCount": 0 })),
        )
        .mount(&registry)
        .await;
    Mock::given(method("GET"))
        .and(path("/down/studies"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&registry)
        .await;

    let dir = tempfile::tempdir().expect("tmp dir");
    let (transcripts_path, messages_path) = fixtures(&dir);
    let store = Arc::new(TranscriptStore::load(&transcripts_path, &messages_path).expect("store"));

    let app_for = |prefix: &str| {
        let client = ClinicalTrialsClient::new(&format!("{}/{prefix}", registry.uri()), None)
            .expect("registry client");
        build_router(AppState::new(
            Arc::clone(&store),
            Arc::new(CannedAnalyzer),
            CascadingSearch::new(Arc::new(client)),
        ))
    };
    let client = reqwest::Client::new();

    let (base, shutdown_tx, handle) = start_server(app_for("empty")).await;
    let resp = client
        .post(format!("{base}/api/transcripts/t1/process"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No clinical trials found for the given transcript");
    let _ = shutdown_tx.send(());
    let _ = handle.await;

    let (base, shutdown_tx, handle) = start_server(app_for("down")).await;
    let resp = client
        .post(format!("{base}/api/transcripts/t1/process"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("candidate searches failed"));
    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

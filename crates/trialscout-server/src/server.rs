use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trialscout_search::{ClinicalTrialsClient, CascadingSearch};

use crate::{
    analyzer::{OpenAiAnalyzer, TranscriptAnalyzer},
    config::AppConfig,
    process::TranscriptProcessor,
    routes,
    transcripts::TranscriptStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TranscriptStore>,
    pub processor: TranscriptProcessor,
}

impl AppState {
    pub fn new(
        store: Arc<TranscriptStore>,
        analyzer: Arc<dyn TranscriptAnalyzer>,
        search: CascadingSearch,
    ) -> Self {
        let processor = TranscriptProcessor::new(Arc::clone(&store), analyzer, search);
        Self { store, processor }
    }

    /// Wires the production collaborators described by `cfg`.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let store = TranscriptStore::load(
            &cfg.transcripts.transcripts_path,
            &cfg.transcripts.messages_path,
        )
        .context("loading transcripts")?;
        tracing::info!(transcripts = store.list().len(), "Transcripts loaded");

        let registry =
            ClinicalTrialsClient::new(&cfg.registry.base_url, cfg.registry.request_timeout())
                .context("creating registry client")?;
        let search = CascadingSearch::new(Arc::new(registry))
            .with_options(cfg.registry.search_options())
            .with_candidate_timeout(cfg.registry.candidate_timeout());

        if cfg.analyzer.api_key.is_none() {
            tracing::warn!("No analyzer API key configured; transcript processing will fail");
        }
        let analyzer = OpenAiAnalyzer::new(
            &cfg.analyzer.base_url,
            cfg.analyzer.api_key.clone(),
            cfg.analyzer.request_timeout(),
        )
        .context("creating analyzer client")?
        .with_overrides(cfg.analyzer.overrides());

        Ok(Self::new(Arc::new(store), Arc::new(analyzer), search))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    Ok(build_router(AppState::from_config(cfg)?))
}

pub struct TrialScoutServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<TrialScoutServer> {
        let app = build_app(&self.config)?;
        Ok(TrialScoutServer {
            addr: self.addr,
            app,
        })
    }
}

impl TrialScoutServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

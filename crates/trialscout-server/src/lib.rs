pub mod analyzer;
pub mod config;
pub mod error;
pub mod observability;
pub mod process;
pub mod routes;
pub mod server;
pub mod transcripts;

pub use server::{AppState, ServerBuilder, TrialScoutServer, build_app, build_router};

use std::env;

use trialscout_server::ServerBuilder;
use trialscout_server::config::loader::{CONFIG_PATH_ENV, ConfigLocation, load_config};
use trialscout_server::observability;

#[tokio::main]
async fn main() {
    // .env is optional; only a broken one is worth a warning
    let dotenv = dotenvy::dotenv();
    if let Err(e) = &dotenv {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    let location = ConfigLocation::resolve(env::args().skip(1), env::var(CONFIG_PATH_ENV).ok());
    let cfg = match load_config(Some(location.path())) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error ({}): {e}", location.path());
            std::process::exit(2);
        }
    };

    observability::init_tracing(&cfg.logging);
    tracing::info!(
        path = location.path(),
        source = location.source(),
        dotenv = dotenv.is_ok(),
        "Configuration loaded"
    );

    let server = match ServerBuilder::new().with_config(cfg).build() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Server initialization failed");
            std::process::exit(2);
        }
    };

    if let Err(err) = server.run().await {
        tracing::error!(error = %err, "Server error");
    }
}

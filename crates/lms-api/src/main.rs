//! Library API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p lms-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use lms_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration decides the log format, so load it before tracing is up
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        "Starting Library API Server..."
    );

    if let Err(e) = lms_api::run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

//! Warranty API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p warranty-api
//! ```
//!
//! Configuration is loaded from environment variables.

use warranty_common::{init_telemetry, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so tracing can pick the right format
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(config.app.env) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.server.port,
        "Starting warranty API server"
    );

    if let Err(e) = warranty_api::run(config).await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

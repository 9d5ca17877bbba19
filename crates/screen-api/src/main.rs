//! Screen-time API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p screen-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` when present).

use screen_common::{try_init_tracing, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        address = %config.api.address(),
        "Configuration loaded"
    );

    if let Err(e) = screen_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

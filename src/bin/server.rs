//! MarketPulse Server - JSON web API
//!
//! Serves the dashboard endpoints and runs update jobs in the background.
//! Metrics are pushed via structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! PORT=8000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `DATABASE_URL` - SQLite url (default: sqlite://data/marketpulse.db)
//! - `SERVER_HOST` / `PORT` - bind address (default: 0.0.0.0:8000)
//! - `FRED_API_KEY` - required by the update job
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `METRICS_REPORT_INTERVAL_SECS` - Interval between metric outputs (default: 60)

use anyhow::Result;
use marketpulse::application::system::Application;
use marketpulse::config::Config;
use marketpulse::infrastructure::observability::MetricsReporter;
use marketpulse::interfaces::api::ApiServer;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("MarketPulse Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let readiness = config.readiness();
    if !readiness.ready {
        warn!(
            "Missing settings: {}. Updates are disabled until they are set.",
            readiness.missing.join(", ")
        );
    }
    for warning in &readiness.warnings {
        warn!("{}", warning);
    }

    let app = Arc::new(Application::build(config.clone()).await?);

    if config.observability.enabled {
        let reporter = MetricsReporter::new(
            app.frames.clone(),
            app.artifacts.clone(),
            &config.model.model_name,
            app.metrics.clone(),
            config.observability.report_interval_secs,
        );
        tokio::spawn(async move {
            reporter.run().await;
        });
        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability.report_interval_secs
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    let addr = config.server.bind_address();
    ApiServer::new(app).serve(&addr).await?;

    info!("Shutdown signal received. Exiting...");
    Ok(())
}

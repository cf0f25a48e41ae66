use super::handlers;
use crate::application::system::Application;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub struct ApiServer {
    app: Arc<Application>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(app: Arc<Application>) -> Self {
        Self { app }
    }

    fn cors(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .app
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect();

        let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        if origins.is_empty() {
            cors.allow_origin(Any)
        } else {
            cors.allow_origin(origins)
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(handlers::health))
            .route("/api/timeseries", get(handlers::timeseries))
            .route("/api/macro-snapshot", get(handlers::macro_snapshot))
            .route("/api/spx-direction", get(handlers::spx_direction))
            .route("/api/news", get(handlers::news))
            .route("/api/update", post(handlers::trigger_update))
            .layer(self.cors())
            .layer(TraceLayer::new_for_http())
            .with_state(AppState {
                app: self.app.clone(),
            })
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("MarketPulse API listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for shutdown signal: {}", e);
                }
            })
            .await?;

        Ok(())
    }
}

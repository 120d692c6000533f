use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_enrich_api::handlers::{self, AppState};
use lead_enrich_api::{Config, LeadEnricher};

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, wires up the enrichment
/// pipeline, and starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_enrich_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env()?);

    // Wire up the enrichment pipeline with live network collaborators
    let enricher = Arc::new(LeadEnricher::new(config.clone())?);
    tracing::info!("Enrichment pipeline initialized");

    let app_state = Arc::new(AppState {
        config: config.clone(),
        enricher,
    });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/enrich", post(handlers::enrich))
        .route("/api/v1/enrich/bulk", post(handlers::enrich_bulk))
        // 5 MB cap: bulk payloads are plain JSON profiles
        .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

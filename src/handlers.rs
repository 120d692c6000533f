use crate::config::Config;
use crate::enrichment::LeadEnricher;
use crate::errors::AppError;
use crate::models::{EnrichedLead, LeadProfile};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// The enrichment pipeline, shared across all requests.
    pub enricher: Arc<LeadEnricher>,
}

/// Request body for bulk enrichment.
#[derive(Debug, Deserialize)]
pub struct BulkEnrichRequest {
    pub leads: Vec<LeadProfile>,
    /// Worker pool width; falls back to the configured default.
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// Response body for bulk enrichment.
#[derive(Debug, Serialize)]
pub struct BulkEnrichResponse {
    pub results: Vec<EnrichedLead>,
    pub count: usize,
    pub enriched_at: DateTime<Utc>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-enrich-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/enrich
///
/// Enriches a single lead profile with a best-guess business email,
/// phone, and lead-quality score. Best effort: always returns 200 with
/// a record, even when nothing could be found.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `lead` - The lead profile to enrich.
///
/// # Returns
///
/// * `Json<EnrichedLead>` - The enriched record.
pub async fn enrich(
    State(state): State<Arc<AppState>>,
    Json(lead): Json<LeadProfile>,
) -> Json<EnrichedLead> {
    tracing::info!(
        "POST /api/v1/enrich - username: {:?}",
        lead.username.as_deref().unwrap_or("<none>")
    );
    Json(state.enricher.enrich_lead(&lead).await)
}

/// POST /api/v1/enrich/bulk
///
/// Enriches a batch of leads with bounded parallelism. Returns one
/// result per submitted lead, in submission order; leads whose
/// pipeline failed unexpectedly come back untouched.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The batch of leads plus an optional concurrency override.
///
/// # Returns
///
/// * `Result<Json<BulkEnrichResponse>, AppError>` - The batch results or a validation error.
pub async fn enrich_bulk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkEnrichRequest>,
) -> Result<Json<BulkEnrichResponse>, AppError> {
    if request.leads.is_empty() {
        return Err(AppError::BadRequest(
            "leads must contain at least one profile".to_string(),
        ));
    }

    let concurrency = request
        .concurrency
        .filter(|&c| c > 0)
        .unwrap_or(state.config.max_concurrency);

    tracing::info!(
        "POST /api/v1/enrich/bulk - {} leads, concurrency {}",
        request.leads.len(),
        concurrency
    );

    let results = state.enricher.enrich_bulk(request.leads, concurrency).await;
    let count = results.len();

    Ok(Json(BulkEnrichResponse {
        results,
        count,
        enriched_at: Utc::now(),
    }))
}

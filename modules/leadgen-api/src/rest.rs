use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use leadgen_common::{BatchMetrics, CanonicalLead, LeadgenError, SearchRequest};
use leadgen_pipeline::{GeneratedQuery, SearchOutcome};

use crate::auth::AuthenticatedUser;
use crate::AppState;

// --- Response bodies ---

#[derive(Serialize)]
struct ServiceHealth {
    oracle: &'static str,
    scraper: &'static str,
    store: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct Persistence {
    saved: bool,
    inserted_count: usize,
    duplicates_filtered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    message: String,
    request_id: Uuid,
    leads: Vec<CanonicalLead>,
    metrics: BatchMetrics,
    query: GeneratedQuery,
    persistence: Persistence,
}

/// Most lead ids accepted by one bulk operation.
const MAX_BULK_LEAD_IDS: usize = 100;

#[derive(Deserialize)]
pub struct BulkLeadRequest {
    lead_ids: Vec<String>,
    operation: String,
}

#[derive(Serialize)]
struct BulkOperationResponse {
    success: bool,
    processed: usize,
    successful: usize,
    failed: usize,
    results: Vec<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (
        status,
        Json(serde_json::json!({"success": false, "error": message})),
    )
        .into_response()
}

// --- Handlers ---

pub async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store_ok = state.store.is_healthy().await;

    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        services: ServiceHealth {
            oracle: if state.search.has_oracle() { "configured" } else { "disabled" },
            scraper: "configured",
            store: if store_ok { "ok" } else { "unavailable" },
        },
    })
}

pub async fn api_search_leads(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(body): Json<SearchRequest>,
) -> Response {
    let outcome = match state.search.search(body, &user.user_id).await {
        Ok(outcome) => outcome,
        Err(LeadgenError::InvalidCriteria(reason)) => {
            return error_response(StatusCode::BAD_REQUEST, reason);
        }
        Err(e) => {
            error!(user = %user.user_id, error = %e, "Lead search failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Lead search failed");
        }
    };

    let persistence = persist(&state, &outcome, &user.user_id).await;
    let message = if persistence.saved {
        outcome.message()
    } else {
        format!(
            "{} The leads could not be saved and will not appear in your lead list.",
            outcome.message()
        )
    };

    Json(SearchResponse {
        success: true,
        message,
        request_id: outcome.request_id,
        leads: outcome.leads,
        metrics: outcome.metrics,
        query: outcome.query,
        persistence,
    })
    .into_response()
}

pub async fn api_lead_stats(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Response {
    match state.store.stats(&user.user_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            warn!(user = %user.user_id, error = %e, "Failed to load lead stats");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load lead stats")
        }
    }
}

pub async fn api_bulk_operation(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(body): Json<BulkLeadRequest>,
) -> Response {
    if body.operation != "delete" {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported operation: {}", body.operation),
        );
    }

    let mut ids: Vec<String> = Vec::with_capacity(body.lead_ids.len());
    for id in body.lead_ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    if ids.is_empty() || ids.len() > MAX_BULK_LEAD_IDS {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Between 1 and {MAX_BULK_LEAD_IDS} lead ids are required"),
        );
    }

    match state.store.delete(&ids, &user.user_id).await {
        Ok(deleted) => {
            info!(
                user = %user.user_id,
                requested = ids.len(),
                deleted = deleted.len(),
                "Bulk delete"
            );
            Json(BulkOperationResponse {
                success: true,
                processed: ids.len(),
                successful: deleted.len(),
                failed: ids.len() - deleted.len(),
                results: deleted,
            })
            .into_response()
        }
        Err(e) => {
            error!(user = %user.user_id, error = %e, "Bulk delete failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error performing bulk operation")
        }
    }
}

/// Save the new leads. A failure is reported, never raised.
async fn persist(state: &AppState, outcome: &SearchOutcome, owner: &str) -> Persistence {
    let mut persistence = Persistence {
        saved: true,
        inserted_count: 0,
        duplicates_filtered: outcome.duplicates_filtered,
        error: None,
    };
    if outcome.leads.is_empty() {
        return persistence;
    }

    match state.store.upsert(&outcome.leads, owner).await {
        Ok(summary) => {
            info!(
                request_id = %outcome.request_id,
                inserted = summary.inserted_count,
                "Saved leads"
            );
            persistence.inserted_count = summary.inserted_count;
        }
        Err(e) => {
            let failure = LeadgenError::Persistence(e.to_string());
            error!(request_id = %outcome.request_id, error = %failure, "Failed to save leads");
            persistence.saved = false;
            persistence.error = Some(failure.to_string());
        }
    }
    persistence
}

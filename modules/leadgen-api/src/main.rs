use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use apify_client::ApifyClient;
use leadgen_common::Config;
use leadgen_pipeline::{LeadSearch, LeadStore, QueryBuilder, SearchSettings, TextCompleter};
use leadgen_store::PgLeadStore;

mod auth;
mod jwt;
mod rest;

use jwt::JwtService;

pub struct AppState {
    pub search: LeadSearch,
    pub store: Arc<dyn LeadStore>,
    pub jwt: JwtService,
}

pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        // Health check
        .route("/health", get(rest::api_health))
        // REST API
        .route("/api/leads/search", post(rest::api_search_leads))
        .route("/api/leads/stats", get(rest::api_lead_stats))
        .route("/api/leads/bulk-operation", post(rest::api_bulk_operation))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (no query params, no bodies)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadgen=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let store = PgLeadStore::connect(&config.database_url).await?;
    store.migrate().await?;
    let store: Arc<dyn LeadStore> = Arc::new(store);

    let oracle: Option<Arc<dyn TextCompleter>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAi::new(key.clone(), config.openai_model.clone()))),
        None => {
            warn!("OPENAI_API_KEY not set, search queries will be assembled from filters only");
            None
        }
    };
    let scraper = Arc::new(
        ApifyClient::new(config.apify_api_token.clone()).with_actor(config.apify_actor_id.clone()),
    );

    let search = LeadSearch::new(
        QueryBuilder::new(oracle),
        scraper,
        store.clone(),
        SearchSettings::from(&config),
    );

    let state = Arc::new(AppState {
        search,
        store,
        jwt: JwtService::new(&config.jwt_secret),
    });

    let app = build_router(state, &config.allowed_origins);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Lead generation API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

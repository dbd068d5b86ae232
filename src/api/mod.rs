//! HTTP API - thin glue between transport and the agents.
//!
//! Routes:
//! - `POST /travel` - trip-planning queries
//! - `POST /blog-generator` - blog-generation requests
//! - `GET /health` - liveness probe
//!
//! The handlers validate input, delegate to the agents, and map outcomes to
//! status codes; all agent logic lives below this layer.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::blog::{BlogGenerator, BlogRequest};
use crate::config::Config;
use crate::llm;
use crate::planner::TripPlanner;

use types::{ErrorResponse, HealthResponse, TravelRequest, TravelResponse};

/// Shared state for the request handlers.
pub struct AppState {
    pub trip: TripPlanner,
    pub blog: BlogGenerator,
}

/// Build the router for the given state.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/travel", post(travel))
        .route("/blog-generator", post(blog_generator))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Construct the agents and serve the API until shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let model = llm::client_from_config(&config)?;
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
        .build()?;
    let state = Arc::new(AppState {
        trip: TripPlanner::new(&config, Arc::clone(&model), http.clone())?,
        blog: BlogGenerator::new(&config, model, http)?,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, routes(state)).await?;

    Ok(())
}

async fn travel(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TravelRequest>,
) -> Response {
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No query provided")),
        )
            .into_response();
    };

    info!(query = %query, "processing /travel request");
    let response = state.trip.process_query(&query, None).await;

    Json(TravelResponse { response }).into_response()
}

async fn blog_generator(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BlogRequest>,
) -> Response {
    if !request.has_topic() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Either 'user_prompt' or 'tour_itinerary' must be provided",
            )),
        )
            .into_response();
    }

    info!(prompt = %request.user_prompt, "processing /blog-generator request");
    let response = state.blog.process_query(&request).await;

    Json(response).into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

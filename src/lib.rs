use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod middleware;

use crate::api::review::ReviewDoc;
use crate::app_state::AppState;

/// Builds the full HTTP application: review routes, health checks and API docs.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::review::review_routes(state.clone()))
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ReviewDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

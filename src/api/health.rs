use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::json;

use crate::app_state::AppState;

/// Defines health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(liveness_check))  // ✅ Liveness check
        .route("/health/ready", get(readiness_check)) // ✅ Readiness check
}

/// **Liveness Check (Basic Check)**  
/// - ✅ Verifies that the API is running  
/// - ❌ Does NOT check the review store  
async fn liveness_check() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "API is live" }))
}

/// **Readiness Check (Review Store Connectivity Check)**  
/// - ✅ Pings the review store  
/// - ❌ Returns `503` if the store is down  
async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let backend = state.store.backend_tag();
    state.store.ping().await.map_err(|e| {
        tracing::error!("Readiness check failed for {backend} store: {e}");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": "Review store unavailable", "store": backend })),
        )
    })?;

    Ok(Json(json!({ "success": true, "message": "API is ready", "store": backend })))
}

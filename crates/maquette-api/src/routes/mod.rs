pub mod agents;
pub mod conversations;
pub mod health;

use axum::{
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("No route for {}", uri.path()),
            "available_endpoints": [
                "GET /health",
                "GET /agents",
                "POST /{agent_id}/invoke",
                "POST /{agent_id}/stream",
                "POST /{agent_id}/stop",
                "GET /conversations",
                "GET /conversations/{thread_id}",
            ],
        })),
    )
}

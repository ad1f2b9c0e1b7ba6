use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::AppState;

/// Bearer-token gate applied to every route except /health.
///
/// Only presence is checked here; validating the token belongs to the
/// upstream identity layer. Disabled entirely via `auth.required = false`
/// (or the AUTH_DISABLED environment switch).
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if !state.config.auth.required {
        return next.run(req).await;
    }

    let token_present = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| !token.trim().is_empty())
        .unwrap_or(false);

    if token_present {
        next.run(req).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "Missing bearer token",
            })),
        )
            .into_response()
    }
}

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StopRequest {
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StopResponse {
    pub status: String,
    pub message: String,
}

/// Request cancellation of an in-flight generation.
///
/// Idempotent: stopping a thread with nothing running still succeeds. The
/// streaming loop observes the flipped flag at its next event boundary.
#[utoipa::path(
    post,
    path = "/{agent_id}/stop",
    params(
        ("agent_id" = String, Path, description = "Agent ID")
    ),
    request_body = StopRequest,
    responses(
        (status = 200, description = "Stop acknowledged", body = StopResponse),
        (status = 400, description = "Missing thread_id")
    ),
    tag = "agents"
)]
pub async fn stop_generation(
    State(state): State<Arc<AppState>>,
    Path(_agent_id): Path<String>,
    Json(req): Json<StopRequest>,
) -> ApiResult<Json<StopResponse>> {
    let thread_id = req
        .thread_id
        .ok_or_else(|| ApiError::BadRequest("thread_id is required".to_string()))?;

    state.generations.request_stop(&thread_id).await;

    Ok(Json(StopResponse {
        status: "success".to_string(),
        message: format!("Stop requested for thread {thread_id}"),
    }))
}

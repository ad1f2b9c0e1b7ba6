use axum::{
    extract::{Path, State},
    Json,
};
use maquette_engine::EngineInput;
use maquette_types::Message;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    handlers::ChatRequest,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct InvokeResponse {
    pub content: String,
    pub thread_id: String,
    pub run_id: String,
}

/// Run an agent turn to completion and return one JSON response.
///
/// Same validation and thread/run resolution as the streaming path, but no
/// partial delivery and no cancellation once issued.
#[utoipa::path(
    post,
    path = "/{agent_id}/invoke",
    params(
        ("agent_id" = String, Path, description = "Agent ID")
    ),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Final agent answer", body = InvokeResponse),
        (status = 400, description = "Missing message"),
        (status = 404, description = "Unknown agent"),
        (status = 500, description = "Agent execution failed")
    ),
    tag = "agents"
)]
pub async fn invoke_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<InvokeResponse>> {
    let text = req.text().ok_or(ApiError::MissingMessage)?.to_string();
    let agent = state
        .agents
        .get(&agent_id)
        .cloned()
        .ok_or(ApiError::AgentNotFound(agent_id))?;

    let thread_id = req
        .thread_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let run_id = Uuid::new_v4().to_string();

    tracing::info!(thread_id = %thread_id, run_id = %run_id, "invoke turn started");

    state.store.append(&thread_id, Message::human(text)).await;
    let history = state.store.get_or_create(&thread_id).await.messages;

    let input = EngineInput {
        run_id: run_id.clone(),
        thread_id: thread_id.clone(),
        system_prompt: agent.definition.system_prompt.clone(),
        messages: history,
    };

    let content = state
        .invoker
        .invoke(Arc::clone(&agent.engine), input)
        .await?;

    if !content.is_empty() {
        state
            .store
            .append(&thread_id, Message::ai(content.clone()))
            .await;
    }

    Ok(Json(InvokeResponse {
        content,
        thread_id,
        run_id,
    }))
}

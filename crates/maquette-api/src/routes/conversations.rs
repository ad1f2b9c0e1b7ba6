use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use maquette_types::{Conversation, ConversationSummary, Message};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub thread_id: String,
    pub message_count: usize,
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListConversationsResponse {
    #[schema(value_type = Vec<Object>)]
    pub conversations: Vec<ConversationSummary>,
    pub count: usize,
}

/// List all stored conversations as summaries
#[utoipa::path(
    get,
    path = "/conversations",
    responses(
        (status = 200, description = "Conversation summaries", body = ListConversationsResponse)
    ),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> Json<ListConversationsResponse> {
    let conversations = state.store.list().await;
    let count = conversations.len();

    Json(ListConversationsResponse {
        conversations,
        count,
    })
}

/// Fetch one conversation by thread id
#[utoipa::path(
    get,
    path = "/conversations/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Full conversation", body = ConversationResponse),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ConversationResponse>> {
    let conversation = state
        .store
        .get(&thread_id)
        .await
        .ok_or(ApiError::ConversationNotFound(thread_id))?;

    Ok(Json(conversation_to_response(conversation)))
}

fn conversation_to_response(conversation: Conversation) -> ConversationResponse {
    ConversationResponse {
        thread_id: conversation.thread_id,
        message_count: conversation.messages.len(),
        messages: conversation.messages,
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }
}

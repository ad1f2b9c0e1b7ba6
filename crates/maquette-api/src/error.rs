use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Missing required field: message")]
    MissingMessage,

    #[error("Agent execution failed: {0}")]
    Engine(#[from] maquette_engine::EngineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable code carried in the `error` field
    fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "agent_not_found",
            Self::ConversationNotFound(_) => "conversation_not_found",
            Self::BadRequest(_) | Self::MissingMessage => "invalid_request",
            Self::Engine(_) => "engine_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::AgentNotFound(_) | ApiError::ConversationNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) | ApiError::MissingMessage => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Engine(e) => {
                tracing::error!("Engine error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": self.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::AgentNotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MissingMessage.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Engine(maquette_engine::EngineError::Run("boom".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

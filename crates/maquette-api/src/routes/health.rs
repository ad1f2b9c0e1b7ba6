use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub agents_count: usize,
    pub available_agents: Vec<String>,
    pub components: HashMap<String, String>,
}

/// Health check endpoint. The only route outside the auth gate.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut components = HashMap::new();
    components.insert("conversation_store".to_string(), "ok".to_string());
    components.insert("generation_registry".to_string(), "ok".to_string());
    components.insert("agent_registry".to_string(), "ok".to_string());

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        agents_count: state.agents.len(),
        available_agents: state
            .agents
            .definitions()
            .map(|d| d.id.clone())
            .collect(),
        components,
    })
}

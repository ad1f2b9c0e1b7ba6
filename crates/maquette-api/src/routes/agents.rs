use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// List configured agents
#[utoipa::path(
    get,
    path = "/agents",
    responses(
        (status = 200, description = "List of available agents", body = [AgentInfo])
    ),
    tag = "agents"
)]
pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentInfo>> {
    let agents = state
        .agents
        .definitions()
        .map(|d| AgentInfo {
            id: d.id.clone(),
            name: d.name.clone(),
            description: d.description.clone(),
        })
        .collect();

    Json(agents)
}

use serde::{Deserialize, Serialize};

/// Static description of a configured agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Instructions handed to the engine with every run; never exposed on
    /// the listing endpoint.
    #[serde(default, skip_serializing)]
    pub system_prompt: String,
}

impl AgentDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

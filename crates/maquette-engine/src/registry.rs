use std::sync::Arc;

use maquette_types::AgentDefinition;

use crate::engine::AgentEngine;

/// A configured agent: its public definition plus the engine that runs it
#[derive(Clone)]
pub struct AgentHandle {
    pub definition: AgentDefinition,
    pub engine: Arc<dyn AgentEngine>,
}

/// Lookup table of configured agents, built once at startup
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentHandle>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, definition: AgentDefinition, engine: Arc<dyn AgentEngine>) -> Self {
        self.agents.push(AgentHandle { definition, engine });
        self
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentHandle> {
        self.agents.iter().find(|a| a.definition.id == agent_id)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.agents.iter().map(|a| &a.definition)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedEngine;

    #[test]
    fn test_lookup_by_id() {
        let registry = AgentRegistry::new().register(
            AgentDefinition::new("mockup", "Mockup Agent", "Builds mockups", ""),
            Arc::new(ScriptedEngine::answering("ok")),
        );

        assert!(registry.get("mockup").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.len(), 1);
    }
}

use std::sync::Arc;
use std::time::Duration;

use maquette_engine::{AgentInvoker, AgentRegistry, InvokerSettings};
use maquette_store::{ConversationStore, GenerationRegistry};

use crate::config::Config;

/// Shared application state passed to all handlers.
///
/// The store and registry are the two process-wide mutable maps; injecting
/// them here (rather than module-level statics) keeps them substitutable
/// with a real datastore later.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<ConversationStore>,
    pub generations: Arc<GenerationRegistry>,
    pub agents: Arc<AgentRegistry>,
    pub invoker: AgentInvoker,
}

impl AppState {
    pub fn new(config: Config, agents: AgentRegistry) -> Self {
        let invoker = AgentInvoker::new(InvokerSettings {
            chunk_size: config.stream.chunk_size,
            chunk_delay: Duration::from_millis(config.stream.chunk_delay_ms),
        });

        Self {
            config: Arc::new(config),
            store: Arc::new(ConversationStore::new()),
            generations: Arc::new(GenerationRegistry::new()),
            agents: Arc::new(agents),
            invoker,
        }
    }

    pub fn cleanup_grace(&self) -> Duration {
        Duration::from_millis(self.config.stream.cleanup_grace_ms)
    }
}

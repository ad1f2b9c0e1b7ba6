pub mod agent;
pub mod conversation;
pub mod events;
pub mod message;

pub use agent::AgentDefinition;
pub use conversation::{Conversation, ConversationSummary};
pub use events::StreamEvent;
pub use message::{Message, Role, ToolCall};

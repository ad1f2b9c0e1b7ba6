pub mod conversations;
pub mod generation;

pub use conversations::ConversationStore;
pub use generation::GenerationRegistry;

pub mod engine;
pub mod invoker;
pub mod mockup;
pub mod registry;
pub mod scripted;

pub use engine::{AgentEngine, EngineError, EngineInput, EngineUpdate};
pub use invoker::{AgentInvoker, InvokerSettings, FALLBACK_ANSWER};
pub use mockup::MockupEngine;
pub use registry::{AgentHandle, AgentRegistry};
pub use scripted::ScriptedEngine;

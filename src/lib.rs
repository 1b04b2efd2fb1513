// Public modules
pub mod agents;
pub mod chat;
pub mod client;
pub mod error;
pub mod markup;
pub mod message;
pub mod observability;
pub mod render;
pub mod types;
pub mod workflow;

// Re-exports
pub use agents::{AgentBadge, AgentDescriptor, AgentId};
pub use client::{QueryBackend, TutorClient};
pub use error::{Error, Result};
pub use markup::format_markup;
pub use message::{Message, Sender};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, RecordingRenderer, RenderEvent, Renderer};
pub use types::*;
pub use workflow::{WorkflowStep, plan, specialist_steps};

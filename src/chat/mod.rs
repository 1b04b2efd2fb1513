//! Interactive chat with the AI Tutor backend.
//!
//! This module provides the REPL-facing half of the crate:
//!
//! - One backend round trip per submitted query
//! - A simulated agent workflow panel beside the log
//! - Slash commands for session control
//! - Configurable backend, colors and cosmetic timing
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The chat session controller
//! - [`commands`]: Slash command parsing and handling

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, RecordingRenderer, RenderEvent, Renderer};
pub use commands::{ChatCommand, EXAMPLE_QUESTIONS, example_question, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, GENERIC_FAILURE_MESSAGE, SessionStats, SubmitOutcome};

//! Entries of the chat log.

use crate::agents::{AgentBadge, AgentId};
use crate::markup::format_markup;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The person at the keyboard.
    User,
    /// The tutor backend, or the client speaking on its behalf.
    Bot,
}

/// One entry of the chat log.
///
/// User text is kept verbatim.  Bot text is stored already formatted into display markup, so
/// `text` is exactly what the log shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display text.
    pub text: String,
    /// Author of the message.
    pub sender: Sender,
    /// Optional agent badge; only bot messages carry one.
    pub badge: Option<AgentBadge>,
}

impl Message {
    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            badge: None,
        }
    }

    /// Creates a bot message from raw markup.
    pub fn bot(markup: &str) -> Self {
        Self {
            text: format_markup(markup),
            sender: Sender::Bot,
            badge: None,
        }
    }

    /// Attaches an agent badge.  User messages never carry one.
    pub fn with_badge(mut self, agent: AgentId) -> Self {
        if self.sender == Sender::Bot {
            self.badge = Some(*agent.descriptor());
        }
        self
    }

    /// Returns true if the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

/// Default per-request timeout, in seconds.
const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Default pause before the "Synthesizing Response" step, in milliseconds.
const DEFAULT_SYNTHESIS_DELAY_MS: u32 = 1000;

/// Default time from an answer's arrival until the highlight clears, in milliseconds.
const DEFAULT_HIGHLIGHT_RESET_MS: u32 = 2000;

/// Command-line arguments for the tutorchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the tutor backend.
    #[arrrg(optional, "Backend base URL (default: http://localhost:8000)", "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Start with the workflow panel hidden.
    #[arrrg(flag, "Hide the agent workflow panel")]
    pub hide_workflow: bool,

    /// Badge bot replies with the last highlighted agent.
    #[arrrg(flag, "Show an agent badge on replies")]
    pub badges: bool,

    /// Pause before the synthesis step.
    #[arrrg(optional, "Delay before the synthesis step in ms (default: 1000)", "MS")]
    pub synthesis_delay_ms: Option<u32>,

    /// Time until the agent highlight clears.
    #[arrrg(optional, "Delay until the agent highlight clears in ms (default: 2000)", "MS")]
    pub highlight_reset_ms: Option<u32>,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Backend base URL; `None` defers to the environment and then the client default.
    pub base_url: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether the workflow panel is shown.
    pub show_workflow: bool,

    /// Whether bot replies carry an agent badge.
    pub agent_badges: bool,

    /// Pause between the specialist steps and the synthesis step.
    pub synthesis_delay: Duration,

    /// Time from an answer's arrival until the highlight clears.
    ///
    /// Measured from the same instant as `synthesis_delay`, so the highlight never clears before
    /// the synthesis step.
    pub highlight_reset: Duration,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: from the environment, else `http://localhost:8000`
    /// - Timeout: 60 seconds
    /// - Color: enabled
    /// - Workflow panel: shown
    /// - Agent badges: off
    /// - Synthesis delay: 1 second
    /// - Highlight reset: 2 seconds
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
            use_color: true,
            show_workflow: true,
            agent_badges: false,
            synthesis_delay: Duration::from_millis(DEFAULT_SYNTHESIS_DELAY_MS as u64),
            highlight_reset: Duration::from_millis(DEFAULT_HIGHLIGHT_RESET_MS as u64),
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Shows or hides the workflow panel.
    pub fn with_workflow(mut self, show: bool) -> Self {
        self.show_workflow = show;
        self
    }

    /// Enables or disables agent badges on replies.
    pub fn with_agent_badges(mut self, enabled: bool) -> Self {
        self.agent_badges = enabled;
        self
    }

    /// Sets the pause before the synthesis step.
    pub fn with_synthesis_delay(mut self, delay: Duration) -> Self {
        self.synthesis_delay = delay;
        self
    }

    /// Sets the time until the highlight clears.
    pub fn with_highlight_reset(mut self, delay: Duration) -> Self {
        self.highlight_reset = delay;
        self
    }

    /// Sets both cosmetic delays to zero.
    pub fn without_delays(self) -> Self {
        self.with_synthesis_delay(Duration::ZERO)
            .with_highlight_reset(Duration::ZERO)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.base_url,
            timeout: args
                .timeout
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.timeout),
            use_color: !args.no_color,
            show_workflow: !args.hide_workflow,
            agent_badges: args.badges,
            synthesis_delay: args
                .synthesis_delay_ms
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.synthesis_delay),
            highlight_reset: args
                .highlight_reset_ms
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.highlight_reset),
        }
    }
}

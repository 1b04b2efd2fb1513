//! Output rendering for the chat log and the workflow panel.
//!
//! The chat session never touches a terminal directly.  It drives a [`Renderer`], which owns the
//! two write-only surfaces: the append-only message log and the workflow panel beside it.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::agents::{AgentDescriptor, AgentId};
use crate::message::Message;
use crate::workflow::WorkflowStep;

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the typing placeholder and panel rules).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text.
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code for underlined text (used for headings).
const ANSI_UNDERLINE: &str = "\x1b[4m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for inline code).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code to return to column zero and erase the line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

static DISPLAY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)(strong|em|code|h[1-3])>|<br>")
        .expect("DISPLAY_TAG is a compile-time constant")
});

/// Trait for rendering a chat session.
///
/// This abstraction allows for different render targets:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - An in-memory recording, for tests and embedding
pub trait Renderer: Send {
    /// Append a message to the log.
    fn append_message(&mut self, message: &Message);

    /// Clear the input control after a message was taken from it.
    fn reset_input(&mut self) {}

    /// Reset the workflow panel to its empty state.
    fn clear_workflow(&mut self);

    /// Append a step to the workflow panel.
    fn show_step(&mut self, step: &WorkflowStep);

    /// Highlight one agent, or none.
    fn highlight(&mut self, agent: Option<AgentId>) {
        _ = agent;
    }

    /// Show the transient "typing" placeholder at the end of the log.
    fn show_typing(&mut self);

    /// Remove the "typing" placeholder.
    fn remove_typing(&mut self);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Returns true if the in-flight query should be abandoned.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Converts display markup into terminal text.
///
/// With color, spans become ANSI styles; without it, tags are dropped and inline code keeps its
/// backticks.  `<br>` becomes a newline either way.
pub fn display_to_terminal(text: &str, use_color: bool) -> String {
    DISPLAY_TAG
        .replace_all(text, |caps: &Captures| {
            let Some(tag) = caps.get(2) else {
                return "\n".to_string();
            };
            let closing = !caps[1].is_empty();
            match (tag.as_str(), closing, use_color) {
                (_, true, true) => ANSI_RESET.to_string(),
                ("strong", false, true) => ANSI_BOLD.to_string(),
                ("em", false, true) => ANSI_ITALIC.to_string(),
                ("code", false, true) => ANSI_CYAN.to_string(),
                (_, false, true) => format!("{ANSI_BOLD}{ANSI_UNDERLINE}"),
                ("code", _, false) => "`".to_string(),
                (_, _, false) => String::new(),
            }
        })
        .into_owned()
}

fn agent_color(descriptor: &AgentDescriptor) -> String {
    let (r, g, b) = descriptor.rgb();
    format!("\x1b[38;2;{r};{g};{b}m")
}

/// Plain text renderer with optional ANSI styling.
///
/// User messages are not echoed: the line editor already shows what was typed.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    show_workflow: bool,
    typing: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            show_workflow: true,
            typing: false,
            interrupted: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Shows or hides the workflow panel.
    pub fn set_show_workflow(&mut self, show: bool) {
        self.show_workflow = show;
    }

    /// Returns true if workflow steps are printed.
    pub fn show_workflow(&self) -> bool {
        self.show_workflow
    }

    /// Flushes stdout to ensure immediate display.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn append_message(&mut self, message: &Message) {
        if message.is_user() {
            return;
        }
        if let Some(badge) = &message.badge {
            if self.use_color {
                println!("{}[{}]{ANSI_RESET}", agent_color(badge), badge.display_name);
            } else {
                println!("[{}]", badge.display_name);
            }
        }
        println!("{}", display_to_terminal(&message.text, self.use_color));
        if self.use_color {
            print!("{ANSI_RESET}");
        }
        println!();
        self.flush();
    }

    fn clear_workflow(&mut self) {
        if !self.show_workflow {
            return;
        }
        if self.use_color {
            println!("{ANSI_DIM}-- agent workflow --{ANSI_RESET}");
        } else {
            println!("-- agent workflow --");
        }
        self.flush();
    }

    fn show_step(&mut self, step: &WorkflowStep) {
        if !self.show_workflow {
            return;
        }
        let descriptor = step.descriptor();
        if self.use_color {
            println!(
                "  {}{}{ANSI_RESET} {ANSI_BOLD}{}{ANSI_RESET} {ANSI_DIM}{}{ANSI_RESET}",
                agent_color(descriptor),
                descriptor.display_name,
                step.action,
                step.description,
            );
        } else {
            println!(
                "  [{}] {}: {}",
                descriptor.display_name, step.action, step.description
            );
        }
        self.flush();
    }

    fn show_typing(&mut self) {
        if self.use_color {
            print!("{ANSI_DIM}Thinking...{ANSI_RESET}");
        } else {
            println!("Thinking...");
        }
        self.typing = true;
        self.flush();
    }

    fn remove_typing(&mut self) {
        if self.typing && self.use_color {
            print!("{ANSI_CLEAR_LINE}");
        }
        self.typing = false;
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("Error: {error}");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// One call made against a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// A message was appended to the log.
    Message(Message),
    /// The input control was reset.
    ResetInput,
    /// The workflow panel was cleared.
    ClearWorkflow,
    /// A workflow step was shown.
    Step(WorkflowStep),
    /// The highlighted agent changed.
    Highlight(Option<AgentId>),
    /// The typing placeholder appeared.
    TypingShown,
    /// The typing placeholder disappeared.
    TypingRemoved,
    /// An informational line was printed.
    Info(String),
    /// An error line was printed.
    Error(String),
}

/// Renderer that records every call instead of drawing anything.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Vec<RenderEvent>,
    interrupted: Option<Arc<AtomicBool>>,
}

impl RecordingRenderer {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Every recorded call, oldest first.
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// The message log as drawn.
    pub fn messages(&self) -> Vec<&Message> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// The workflow panel as currently drawn: the steps since the last clear.
    pub fn panel(&self) -> Vec<&WorkflowStep> {
        let start = self
            .events
            .iter()
            .rposition(|event| *event == RenderEvent::ClearWorkflow)
            .map_or(0, |at| at + 1);
        self.events[start..]
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Step(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the typing placeholder is currently showing.
    pub fn typing_visible(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find_map(|event| match event {
                RenderEvent::TypingShown => Some(true),
                RenderEvent::TypingRemoved => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// The most recent highlight, `None` when nothing is highlighted.
    pub fn highlighted(&self) -> Option<AgentId> {
        self.events.iter().rev().find_map(|event| match event {
            RenderEvent::Highlight(agent) => Some(*agent),
            _ => None,
        })?
    }
}

impl Renderer for RecordingRenderer {
    fn append_message(&mut self, message: &Message) {
        self.events.push(RenderEvent::Message(message.clone()));
    }

    fn reset_input(&mut self) {
        self.events.push(RenderEvent::ResetInput);
    }

    fn clear_workflow(&mut self) {
        self.events.push(RenderEvent::ClearWorkflow);
    }

    fn show_step(&mut self, step: &WorkflowStep) {
        self.events.push(RenderEvent::Step(step.clone()));
    }

    fn highlight(&mut self, agent: Option<AgentId>) {
        self.events.push(RenderEvent::Highlight(agent));
    }

    fn show_typing(&mut self) {
        self.events.push(RenderEvent::TypingShown);
    }

    fn remove_typing(&mut self) {
        self.events.push(RenderEvent::TypingRemoved);
    }

    fn print_info(&mut self, info: &str) {
        self.events.push(RenderEvent::Info(info.to_string()));
    }

    fn print_error(&mut self, error: &str) {
        self.events.push(RenderEvent::Error(error.to_string()));
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
        assert!(renderer.show_workflow());
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn plain_terminal_text_drops_tags() {
        assert_eq!(
            display_to_terminal("<h2>Answer</h2><br><strong>4</strong> via <code>2+2</code>", false),
            "Answer\n4 via `2+2`"
        );
    }

    #[test]
    fn colored_terminal_text_uses_ansi() {
        assert_eq!(
            display_to_terminal("<em>x</em><br><strong>y</strong>", true),
            format!("{ANSI_ITALIC}x{ANSI_RESET}\n{ANSI_BOLD}y{ANSI_RESET}")
        );
    }

    #[test]
    fn recording_tracks_panel_and_typing() {
        let mut renderer = RecordingRenderer::new();
        renderer.show_step(&WorkflowStep::analyzing());
        renderer.clear_workflow();
        renderer.show_step(&WorkflowStep::synthesizing());
        renderer.show_typing();
        assert!(renderer.typing_visible());
        renderer.remove_typing();
        assert!(!renderer.typing_visible());
        assert_eq!(renderer.panel(), vec![&WorkflowStep::synthesizing()]);
        assert_eq!(renderer.highlighted(), None);
        renderer.highlight(Some(AgentId::Maths));
        assert_eq!(renderer.highlighted(), Some(AgentId::Maths));
        renderer.highlight(None);
        assert_eq!(renderer.highlighted(), None);
    }

    #[test]
    fn recording_honors_interrupt_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let renderer = RecordingRenderer::new().with_interrupt(flag.clone());
        assert!(!renderer.should_interrupt());
        flag.store(true, Ordering::Relaxed);
        assert!(renderer.should_interrupt());
    }
}

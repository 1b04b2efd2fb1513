//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending a query
//! to the backend.

/// Example questions offered to new users, one per specialist.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "Solve: 2x + 5 = 15",
    "What is the gravitational acceleration on Earth?",
    "What are the properties of Carbon?",
    "What are the latest developments in AI?",
    "If a spacecraft travels at 11 km/s, what percentage of light speed is that?",
];

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the message log and the workflow panel.
    Clear,

    /// Show or hide the workflow panel.
    Workflow(bool),

    /// Toggle agent badges on replies.
    Badges(bool),

    /// List the agents and their display metadata.
    Agents,

    /// List the example questions.
    Examples,

    /// Submit the example question with this 1-based index.
    Example(usize),

    /// Ask the backend for its health report.
    Health,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics (message count, outcomes, etc.).
    Stats,

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular query.
///
/// # Examples
///
/// ```
/// # use tutorchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/example 2").is_some());
/// assert!(parse_command("What is 2+2?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "health" => ChatCommand::Health,
        "agents" => ChatCommand::Agents,
        "examples" => ChatCommand::Examples,
        "example" => match argument {
            Some(arg) => match arg.parse::<usize>() {
                Ok(index) if (1..=EXAMPLE_QUESTIONS.len()).contains(&index) => {
                    ChatCommand::Example(index)
                }
                _ => ChatCommand::Invalid(format!(
                    "/example expects a number between 1 and {}",
                    EXAMPLE_QUESTIONS.len()
                )),
            },
            None => ChatCommand::Invalid("/example requires a number".to_string()),
        },
        "workflow" => match argument {
            Some(arg) => match parse_on_off(arg) {
                Some(value) => ChatCommand::Workflow(value),
                None => ChatCommand::Invalid("/workflow expects 'on' or 'off'".to_string()),
            },
            None => ChatCommand::Invalid("/workflow expects 'on' or 'off'".to_string()),
        },
        "badges" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Badges(value),
            None => ChatCommand::Invalid("/badges expects 'on' or 'off'".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns the example question with the given 1-based index.
pub fn example_question(index: usize) -> Option<&'static str> {
    index
        .checked_sub(1)
        .and_then(|at| EXAMPLE_QUESTIONS.get(at))
        .copied()
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear the conversation and the workflow panel
  /workflow on|off       Show or hide the agent workflow panel
  /badges on|off         Show or hide agent badges on replies
  /agents                List the tutor's agents
  /examples              List example questions
  /example <n>           Ask example question n
  /health                Check the backend's health
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

//! The simulated multi-agent workflow shown beside the chat.
//!
//! None of this reflects what the backend actually did.  The specialist steps are guessed from
//! the outgoing query with a fixed keyword table, purely to give the user something to watch
//! while the answer is produced.

use crate::agents::{AgentDescriptor, AgentId};

/// One simulated stage of query processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    /// The agent this stage is attributed to.
    pub agent: AgentId,
    /// Short title, e.g. "Analyzing Query".
    pub action: String,
    /// One-line description of the stage.
    pub description: String,
}

impl WorkflowStep {
    /// Creates a new step.
    pub fn new(agent: AgentId, action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent,
            action: action.into(),
            description: description.into(),
        }
    }

    /// Creates a step from a raw agent identifier, falling back to root when it is unknown.
    pub fn for_agent_id(
        agent: &str,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(AgentId::resolve(agent), action, description)
    }

    /// The first step of every query.
    pub fn analyzing() -> Self {
        Self::new(
            AgentId::Root,
            "Analyzing Query",
            "Understanding the question and determining the best approach...",
        )
    }

    /// The last step of every answered query.
    pub fn synthesizing() -> Self {
        Self::new(
            AgentId::Root,
            "Synthesizing Response",
            "Combining results from specialist agents into final answer...",
        )
    }

    /// The step shown when the backend reports a failure.
    pub fn error_occurred(message: impl Into<String>) -> Self {
        Self::new(AgentId::Root, "Error Occurred", message)
    }

    /// The step shown when the backend could not be reached.
    pub fn connection_error() -> Self {
        Self::new(
            AgentId::Root,
            "Connection Error",
            "Failed to communicate with the AI system",
        )
    }

    /// The step shown when the user abandons an in-flight query.
    pub fn cancelled() -> Self {
        Self::new(
            AgentId::Root,
            "Request Cancelled",
            "The question was withdrawn before an answer arrived",
        )
    }

    /// Display metadata for the step's agent.
    pub fn descriptor(&self) -> &'static AgentDescriptor {
        self.agent.descriptor()
    }
}

struct KeywordRule {
    agent: AgentId,
    keywords: &'static [&'static str],
    any_digit: bool,
    action: &'static str,
    description: &'static str,
}

const RULES: &[KeywordRule] = &[
    KeywordRule {
        agent: AgentId::Maths,
        keywords: &["math", "calculate", "solve"],
        any_digit: true,
        action: "Mathematics Processing",
        description: "Performing calculations and mathematical analysis...",
    },
    KeywordRule {
        agent: AgentId::Physics,
        keywords: &["physics", "speed", "light", "force", "energy"],
        any_digit: false,
        action: "Physics Analysis",
        description: "Looking up physical constants and applying physics principles...",
    },
    KeywordRule {
        agent: AgentId::Chemistry,
        keywords: &["chemistry", "element", "carbon", "reaction"],
        any_digit: false,
        action: "Chemistry Processing",
        description: "Analyzing chemical properties and reactions...",
    },
    KeywordRule {
        agent: AgentId::NewsAnalyst,
        keywords: &[
            "news",
            "ai",
            "artificial intelligence",
            "latest",
            "current",
            "recent",
            "development",
            "update",
        ],
        any_digit: false,
        action: "News Analysis",
        description: "Searching for latest AI news and developments...",
    },
];

impl KeywordRule {
    fn matches(&self, query: &str, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
            || (self.any_digit && query.bytes().any(|b| b.is_ascii_digit()))
    }

    fn step(&self) -> WorkflowStep {
        WorkflowStep::new(self.agent, self.action, self.description)
    }
}

/// Guesses which specialists a query involves.
///
/// Matching is case-insensitive substring search, one independent test per specialist, so any
/// subset may fire.  Steps come out in table order: mathematics, physics, chemistry, news.
pub fn specialist_steps(query: &str) -> Vec<WorkflowStep> {
    let lowered = query.to_lowercase();
    RULES
        .iter()
        .filter(|rule| rule.matches(query, &lowered))
        .map(KeywordRule::step)
        .collect()
}

/// The full panel for an answered query: analyzing, the guessed specialists, synthesizing.
pub fn plan(query: &str) -> Vec<WorkflowStep> {
    let mut steps = vec![WorkflowStep::analyzing()];
    steps.extend(specialist_steps(query));
    steps.push(WorkflowStep::synthesizing());
    steps
}

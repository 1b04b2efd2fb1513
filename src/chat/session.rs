//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the message log, the workflow panel
//! and the agent highlight, and turns each submitted query into one backend round trip.

use std::time::Duration;

use tokio::time::Instant;

use crate::agents::AgentId;
use crate::chat::config::ChatConfig;
use crate::client::{QueryBackend, TutorClient};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::observability::{
    SESSION_ANSWERED, SESSION_BACKEND_ERRORS, SESSION_CANCELLED, SESSION_IGNORED,
    SESSION_SUBMITS, SESSION_TRANSPORT_ERRORS, SESSION_WORKFLOW_STEPS,
};
use crate::render::Renderer;
use crate::types::{QueryRequest, QueryResponse};
use crate::workflow::{WorkflowStep, plan};

/// The bot message shown when the backend could not be reached or its answer was unreadable.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please check the logs.";

/// How often an in-flight query checks the renderer for an interrupt.
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// How a call to [`ChatSession::submit`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The input was empty after trimming; nothing happened.
    Ignored,
    /// The backend answered and the answer was appended.
    Answered,
    /// The backend reported a failure, which was appended verbatim.
    BackendError,
    /// The backend could not be reached or answered unreadably.
    TransportError,
    /// The user abandoned the query before an answer arrived.
    Cancelled,
}

/// A chat session that manages the log, the workflow panel and backend interactions.
///
/// `submit` takes `&mut self`, so at most one query is ever in flight per session.
pub struct ChatSession<B: QueryBackend = TutorClient> {
    backend: B,
    config: ChatConfig,
    messages: Vec<Message>,
    workflow: Vec<WorkflowStep>,
    active_agent: Option<AgentId>,
    highlight_expires: Option<Instant>,
    counts: OutcomeCounts,
}

#[derive(Debug, Clone, Copy, Default)]
struct OutcomeCounts {
    ignored: u64,
    answered: u64,
    backend_errors: u64,
    transport_errors: u64,
    cancelled: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The number of messages in the log.
    pub message_count: usize,
    /// The number of steps in the workflow panel.
    pub workflow_steps: usize,
    /// The agent currently highlighted, if any.
    pub active_agent: Option<AgentId>,
    /// Submits that were empty after trimming.
    pub ignored: u64,
    /// Queries the backend answered.
    pub answered: u64,
    /// Queries the backend reported a failure for.
    pub backend_errors: u64,
    /// Queries that failed in transport.
    pub transport_errors: u64,
    /// Queries the user abandoned.
    pub cancelled: u64,
}

impl SessionStats {
    /// Total number of queries sent to the backend.
    pub fn queries(&self) -> u64 {
        self.answered + self.backend_errors + self.transport_errors + self.cancelled
    }
}

impl ChatSession<TutorClient> {
    /// Creates a new chat session against the backend named by the configuration.
    pub fn connect(config: ChatConfig) -> Result<Self> {
        let client = TutorClient::with_options(config.base_url.clone(), Some(config.timeout))?;
        Ok(Self::new(client, config))
    }
}

impl<B: QueryBackend> ChatSession<B> {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            messages: Vec::new(),
            workflow: Vec::new(),
            active_agent: None,
            highlight_expires: None,
            counts: OutcomeCounts::default(),
        }
    }

    /// Submits one query and renders everything that follows from it.
    ///
    /// This method:
    /// 1. Appends the user message and resets the workflow panel
    /// 2. Shows the "Analyzing Query" step and the typing placeholder
    /// 3. Sends the query to the backend
    /// 4. Renders the answer, or the failure, as a bot message
    ///
    /// It never fails: every error is rendered, logged and reported through the outcome, and the
    /// typing placeholder is always removed.  An answer's highlight outlives the call; it is
    /// cleared lazily once `highlight_reset` has passed.
    pub async fn submit(&mut self, query: &str, renderer: &mut dyn Renderer) -> SubmitOutcome {
        let query = query.trim();
        if query.is_empty() {
            SESSION_IGNORED.click();
            self.counts.ignored += 1;
            return SubmitOutcome::Ignored;
        }
        SESSION_SUBMITS.click();
        self.expire_highlight(renderer);

        self.append(Message::user(query), renderer);
        renderer.reset_input();

        self.workflow.clear();
        renderer.clear_workflow();
        self.show_step(WorkflowStep::analyzing(), renderer);
        self.set_highlight(Some(AgentId::Root), renderer);

        renderer.show_typing();
        let result = self.await_answer(&QueryRequest::new(query), renderer).await;
        renderer.remove_typing();

        match result {
            Ok(response) => self.answered(query, response, renderer).await,
            Err(err) if err.is_api() => self.backend_failed(err, renderer),
            Err(err) if err.is_abort() => self.cancelled(renderer),
            Err(err) => self.transport_failed(err, renderer),
        }
    }

    async fn await_answer(
        &self,
        request: &QueryRequest,
        renderer: &dyn Renderer,
    ) -> Result<QueryResponse> {
        let query = self.backend.query(request);
        tokio::pin!(query);
        let mut poll = tokio::time::interval(INTERRUPT_POLL);
        loop {
            tokio::select! {
                biased;
                result = &mut query => return result,
                _ = poll.tick() => {
                    if renderer.should_interrupt() {
                        return Err(Error::abort("query interrupted by the user"));
                    }
                }
            }
        }
    }

    async fn answered(
        &mut self,
        query: &str,
        response: QueryResponse,
        renderer: &mut dyn Renderer,
    ) -> SubmitOutcome {
        // plan is analyzing, then the specialists, then synthesizing
        let mut steps = plan(query);
        let synthesis = steps.pop();
        let mut badge = AgentId::Root;
        for step in steps.into_iter().skip(1) {
            let agent = step.agent;
            self.show_step(step, renderer);
            self.set_highlight(Some(agent), renderer);
            badge = agent;
        }

        let mut message = Message::bot(&response.response);
        if self.config.agent_badges {
            message = message.with_badge(badge);
        }
        self.append(message, renderer);

        pause(self.config.synthesis_delay).await;
        if let Some(step) = synthesis {
            let agent = step.agent;
            self.show_step(step, renderer);
            self.set_highlight(Some(agent), renderer);
        }

        let remaining = self
            .config
            .highlight_reset
            .saturating_sub(self.config.synthesis_delay);
        if remaining.is_zero() {
            self.set_highlight(None, renderer);
        } else {
            self.highlight_expires = Some(Instant::now() + remaining);
        }

        SESSION_ANSWERED.click();
        self.counts.answered += 1;
        SubmitOutcome::Answered
    }

    fn backend_failed(&mut self, err: Error, renderer: &mut dyn Renderer) -> SubmitOutcome {
        let message = err.user_message().unwrap_or_default().to_string();
        tracing::warn!(status = ?err.status_code(), %message, "backend reported a failure");

        self.append(Message::bot(&message), renderer);
        self.show_step(WorkflowStep::error_occurred(message), renderer);
        self.set_highlight(None, renderer);

        SESSION_BACKEND_ERRORS.click();
        self.counts.backend_errors += 1;
        SubmitOutcome::BackendError
    }

    fn transport_failed(&mut self, err: Error, renderer: &mut dyn Renderer) -> SubmitOutcome {
        tracing::error!(error = %err, "error sending query");

        self.append(Message::bot(GENERIC_FAILURE_MESSAGE), renderer);
        self.show_step(WorkflowStep::connection_error(), renderer);
        self.set_highlight(None, renderer);

        SESSION_TRANSPORT_ERRORS.click();
        self.counts.transport_errors += 1;
        SubmitOutcome::TransportError
    }

    fn cancelled(&mut self, renderer: &mut dyn Renderer) -> SubmitOutcome {
        tracing::info!("query cancelled before an answer arrived");

        self.show_step(WorkflowStep::cancelled(), renderer);
        self.set_highlight(None, renderer);

        SESSION_CANCELLED.click();
        self.counts.cancelled += 1;
        SubmitOutcome::Cancelled
    }

    fn append(&mut self, message: Message, renderer: &mut dyn Renderer) {
        renderer.append_message(&message);
        self.messages.push(message);
    }

    fn show_step(&mut self, step: WorkflowStep, renderer: &mut dyn Renderer) {
        SESSION_WORKFLOW_STEPS.click();
        renderer.show_step(&step);
        self.workflow.push(step);
    }

    fn set_highlight(&mut self, agent: Option<AgentId>, renderer: &mut dyn Renderer) {
        self.active_agent = agent;
        self.highlight_expires = None;
        renderer.highlight(agent);
    }

    fn highlight_expired(&self) -> bool {
        self.highlight_expires.is_some_and(|expires| Instant::now() >= expires)
    }

    /// Clears the highlight left by the last answer if its reset time has passed.
    ///
    /// Returns true if the highlight was cleared.
    pub fn expire_highlight(&mut self, renderer: &mut dyn Renderer) -> bool {
        if self.highlight_expired() {
            self.set_highlight(None, renderer);
            true
        } else {
            false
        }
    }

    /// Clears the message log, the workflow panel and the highlight.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.workflow.clear();
        self.active_agent = None;
        self.highlight_expires = None;
    }

    /// Returns the message log.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the log.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the workflow panel's steps for the most recent query.
    pub fn workflow(&self) -> &[WorkflowStep] {
        &self.workflow
    }

    /// Returns the currently highlighted agent.
    pub fn active_agent(&self) -> Option<AgentId> {
        if self.highlight_expired() {
            None
        } else {
            self.active_agent
        }
    }

    /// Returns the backend this session talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Shows or hides the workflow panel.
    pub fn set_show_workflow(&mut self, show: bool) {
        self.config.show_workflow = show;
    }

    /// Enables or disables agent badges on replies.
    pub fn set_agent_badges(&mut self, enabled: bool) {
        self.config.agent_badges = enabled;
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            message_count: self.messages.len(),
            workflow_steps: self.workflow.len(),
            active_agent: self.active_agent(),
            ignored: self.counts.ignored,
            answered: self.counts.answered,
            backend_errors: self.counts.backend_errors,
            transport_errors: self.counts.transport_errors,
            cancelled: self.counts.cancelled,
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::markup::format_markup;
    use crate::message::Sender;
    use crate::render::{RecordingRenderer, RenderEvent};
    use crate::workflow::specialist_steps;

    /// Answers queries from a script and records what it was asked.
    #[derive(Default)]
    struct ScriptedBackend {
        answers: Mutex<VecDeque<Result<QueryResponse>>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn answering(answers: Vec<Result<QueryResponse>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl QueryBackend for ScriptedBackend {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
            self.asked.lock().unwrap().push(request.text.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::connection("script exhausted", None)))
        }
    }

    /// Raises the interrupt flag and never answers.
    struct StalledBackend {
        interrupted: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl QueryBackend for StalledBackend {
        async fn query(&self, _: &QueryRequest) -> Result<QueryResponse> {
            self.interrupted.store(true, Ordering::Relaxed);
            std::future::pending().await
        }
    }

    fn session(answers: Vec<Result<QueryResponse>>) -> ChatSession<ScriptedBackend> {
        ChatSession::new(
            ScriptedBackend::answering(answers),
            ChatConfig::new().without_delays(),
        )
    }

    fn bot_messages(renderer: &RecordingRenderer) -> Vec<String> {
        renderer
            .messages()
            .into_iter()
            .filter(|m| m.sender == Sender::Bot)
            .map(|m| m.text.clone())
            .collect()
    }

    fn panel(renderer: &RecordingRenderer) -> Vec<(AgentId, String)> {
        renderer
            .panel()
            .into_iter()
            .map(|step| (step.agent, step.action.clone()))
            .collect()
    }

    #[tokio::test]
    async fn empty_input_is_ignored() {
        let mut session = session(vec![]);
        let mut renderer = RecordingRenderer::new();

        assert_eq!(session.submit("", &mut renderer).await, SubmitOutcome::Ignored);
        assert_eq!(
            session.submit("   \n\t ", &mut renderer).await,
            SubmitOutcome::Ignored
        );

        assert!(renderer.events().is_empty());
        assert_eq!(session.message_count(), 0);
        assert!(session.backend().asked().is_empty());
        assert_eq!(session.stats().ignored, 2);
        assert_eq!(session.stats().queries(), 0);
    }

    #[tokio::test]
    async fn answer_is_formatted_into_one_bot_message() {
        let answer = "**x = 5**\nbecause *2x = 10*";
        let mut session = session(vec![Ok(QueryResponse::new(answer))]);
        let mut renderer = RecordingRenderer::new();

        let outcome = session.submit("  Solve: 2x + 5 = 15  ", &mut renderer).await;

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(session.backend().asked(), vec!["Solve: 2x + 5 = 15"]);
        assert_eq!(bot_messages(&renderer), vec![format_markup(answer)]);
        assert_eq!(session.messages()[0], Message::user("Solve: 2x + 5 = 15"));
        assert!(session.messages()[1].badge.is_none());
        assert!(!renderer.typing_visible());
        assert_eq!(session.active_agent(), None);
        assert_eq!(renderer.highlighted(), None);
    }

    #[tokio::test]
    async fn submit_side_effects_happen_in_order() {
        let mut session = session(vec![Ok(QueryResponse::new("4"))]);
        let mut renderer = RecordingRenderer::new();

        session.submit("What is 2+2?", &mut renderer).await;

        let events = renderer.events();
        assert_eq!(events[0], RenderEvent::Message(Message::user("What is 2+2?")));
        assert_eq!(events[1], RenderEvent::ResetInput);
        assert_eq!(events[2], RenderEvent::ClearWorkflow);
        assert_eq!(events[3], RenderEvent::Step(WorkflowStep::analyzing()));
        assert_eq!(events[4], RenderEvent::Highlight(Some(AgentId::Root)));
        assert_eq!(events[5], RenderEvent::TypingShown);
        assert_eq!(events[6], RenderEvent::TypingRemoved);
        assert_eq!(
            panel(&renderer),
            vec![
                (AgentId::Root, "Analyzing Query".to_string()),
                (AgentId::Maths, "Mathematics Processing".to_string()),
                (AgentId::Root, "Synthesizing Response".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unmatched_query_shows_only_root_steps() {
        let mut session = session(vec![Ok(QueryResponse::new("Hello!"))]);
        let mut renderer = RecordingRenderer::new();

        session.submit("Hello there", &mut renderer).await;

        assert_eq!(
            panel(&renderer),
            vec![
                (AgentId::Root, "Analyzing Query".to_string()),
                (AgentId::Root, "Synthesizing Response".to_string()),
            ]
        );
        assert_eq!(session.workflow().len(), 2);
    }

    #[tokio::test]
    async fn news_query_highlights_news_analyst() {
        let mut session = session(vec![Ok(QueryResponse::new("..."))]);
        let mut renderer = RecordingRenderer::new();

        session.submit("latest AI news", &mut renderer).await;

        assert!(
            renderer
                .events()
                .contains(&RenderEvent::Highlight(Some(AgentId::NewsAnalyst)))
        );
        assert_eq!(panel(&renderer)[1].0, AgentId::NewsAnalyst);
    }

    #[tokio::test]
    async fn backend_failure_message_is_shown_verbatim() {
        let mut session = session(vec![Err(Error::api(
            500,
            "Internal Server Error",
            "server busy",
        ))]);
        let mut renderer = RecordingRenderer::new();

        let outcome = session.submit("What is 2+2?", &mut renderer).await;

        assert_eq!(outcome, SubmitOutcome::BackendError);
        assert_eq!(bot_messages(&renderer), vec!["server busy".to_string()]);
        let last = *renderer.panel().last().unwrap();
        assert_eq!(last, &WorkflowStep::error_occurred("server busy"));
        assert!(!renderer.typing_visible());
        assert_eq!(session.stats().backend_errors, 1);
    }

    #[tokio::test]
    async fn transport_failure_shows_generic_message() {
        let mut session = session(vec![Err(Error::connection("connection refused", None))]);
        let mut renderer = RecordingRenderer::new();

        let outcome = session.submit("What is 2+2?", &mut renderer).await;

        assert_eq!(outcome, SubmitOutcome::TransportError);
        assert_eq!(
            bot_messages(&renderer),
            vec![GENERIC_FAILURE_MESSAGE.to_string()]
        );
        assert_eq!(
            panel(&renderer),
            vec![
                (AgentId::Root, "Analyzing Query".to_string()),
                (AgentId::Root, "Connection Error".to_string()),
            ]
        );
        assert!(!renderer.typing_visible());
        assert_eq!(session.active_agent(), None);
    }

    #[tokio::test]
    async fn unreadable_answer_is_a_transport_failure() {
        let mut session = session(vec![Err(Error::serialization("missing field", None))]);
        let mut renderer = RecordingRenderer::new();

        let outcome = session.submit("hi", &mut renderer).await;

        assert_eq!(outcome, SubmitOutcome::TransportError);
        assert_eq!(
            bot_messages(&renderer),
            vec![GENERIC_FAILURE_MESSAGE.to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_abandons_the_query() {
        let interrupted = Arc::new(AtomicBool::new(false));
        let backend = StalledBackend {
            interrupted: interrupted.clone(),
        };
        let mut session = ChatSession::new(backend, ChatConfig::new());
        let mut renderer = RecordingRenderer::new().with_interrupt(interrupted);

        let outcome = session.submit("What is 2+2?", &mut renderer).await;

        assert_eq!(outcome, SubmitOutcome::Cancelled);
        assert!(!renderer.typing_visible());
        assert!(bot_messages(&renderer).is_empty());
        assert_eq!(
            renderer.panel().last().map(|step| step.action.as_str()),
            Some("Request Cancelled")
        );
        assert_eq!(session.stats().cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn answer_is_shown_before_synthesis_and_highlight_outlives_submit() {
        let backend = ScriptedBackend::answering(vec![
            Ok(QueryResponse::new("c")),
            Ok(QueryResponse::new("hi")),
        ]);
        let mut session = ChatSession::new(backend, ChatConfig::new());
        let mut renderer = RecordingRenderer::new();

        let start = tokio::time::Instant::now();
        session.submit("speed of light", &mut renderer).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(2));

        let tail: Vec<_> = renderer.events().iter().skip(6).cloned().collect();
        assert_eq!(
            tail,
            vec![
                RenderEvent::TypingRemoved,
                RenderEvent::Step(specialist_steps("speed of light")[0].clone()),
                RenderEvent::Highlight(Some(AgentId::Physics)),
                RenderEvent::Message(Message::bot("c")),
                RenderEvent::Step(WorkflowStep::synthesizing()),
                RenderEvent::Highlight(Some(AgentId::Root)),
            ]
        );
        assert_eq!(session.active_agent(), Some(AgentId::Root));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(session.active_agent(), None);
        assert_eq!(session.stats().active_agent, None);

        let seen = renderer.events().len();
        session.submit("Hello there", &mut renderer).await;
        assert_eq!(renderer.events()[seen], RenderEvent::Highlight(None));
    }

    #[tokio::test(start_paused = true)]
    async fn early_submit_keeps_highlight_until_replaced() {
        let backend = ScriptedBackend::answering(vec![
            Ok(QueryResponse::new("a")),
            Ok(QueryResponse::new("b")),
        ]);
        let mut session = ChatSession::new(backend, ChatConfig::new());
        let mut renderer = RecordingRenderer::new();

        session.submit("What is 2+2?", &mut renderer).await;
        let seen = renderer.events().len();
        session.submit("Hello there", &mut renderer).await;

        assert_eq!(
            renderer.events()[seen],
            RenderEvent::Message(Message::user("Hello there"))
        );
        assert!(!session.expire_highlight(&mut renderer));
    }

    #[tokio::test]
    async fn badges_name_the_last_specialist() {
        let backend = ScriptedBackend::answering(vec![
            Ok(QueryResponse::new("a")),
            Ok(QueryResponse::new("b")),
        ]);
        let config = ChatConfig::new().without_delays().with_agent_badges(true);
        let mut session = ChatSession::new(backend, config);
        let mut renderer = RecordingRenderer::new();

        session
            .submit("calculate the energy of carbon", &mut renderer)
            .await;
        session.submit("Hello there", &mut renderer).await;

        let badges: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| m.sender == Sender::Bot)
            .map(|m| m.badge.map(|b| b.id))
            .collect();
        assert_eq!(badges, vec![Some(AgentId::Chemistry), Some(AgentId::Root)]);
    }

    #[tokio::test]
    async fn each_query_resets_the_panel() {
        let mut session = session(vec![
            Ok(QueryResponse::new("one")),
            Ok(QueryResponse::new("two")),
        ]);
        let mut renderer = RecordingRenderer::new();

        session.submit("What is 2+2?", &mut renderer).await;
        session.submit("Hello there", &mut renderer).await;

        assert_eq!(session.workflow().len(), 2);
        assert_eq!(renderer.panel().len(), 2);
        assert_eq!(session.message_count(), 4);
        assert_eq!(session.stats().answered, 2);
        assert_eq!(session.stats().queries(), 2);
    }

    #[tokio::test]
    async fn clear_session() {
        let mut session = session(vec![Ok(QueryResponse::new("x"))]);
        let mut renderer = RecordingRenderer::new();
        session.submit("hi", &mut renderer).await;
        assert_eq!(session.message_count(), 2);

        session.clear();
        assert_eq!(session.message_count(), 0);
        assert!(session.workflow().is_empty());
        assert_eq!(session.active_agent(), None);
    }

    #[test]
    fn connect_uses_configured_backend() {
        let config = ChatConfig::new().with_base_url("http://tutor.example.com:9000");
        let session = ChatSession::connect(config).unwrap();
        assert_eq!(
            session.backend().base_url().as_str(),
            "http://tutor.example.com:9000/"
        );
    }
}

//! Dialogue engine - drives a prompt optimization conversation.
//!
//! Every inbound event (start, user text, cancel) is routed to the handler
//! for the session's current [`DialogueState`]. A handler may generate text,
//! persist a record, and reply through the [`ChatTransport`], then names the
//! next state.
//!
//! Failure policy:
//! - generation failure: user-visible error, conversation forced to `Done`
//! - persistence failure: logged, record id falls back to the sentinel
//! - transport failure: logged; a fatal one forces `Done` and is returned
//!
//! Sessions that reach a terminal state are dropped from the store.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::domain::delivery::{Delivery, DeliveryPolicy};
use crate::domain::dialogue::{
    declines_preferences, is_affirmative, replies, DialogueState, Session,
};
use crate::domain::feedback::{feedback_messages, Extraction, FeedbackExtractor, PromptFeedback};
use crate::domain::foundation::{RecordId, SessionId, ValidationError};
use crate::domain::optimizer::{Mode, ModeCatalog};
use crate::ports::{
    AIProvider, ChatTransport, FollowupRecord, OptimizationRecord, PromptLog, TextFormat,
    TransportError,
};

use super::assembler::{GenerationFailure, ResponseAssembler};
use super::requests::{self, GenerationSettings};
use super::session_store::SessionStore;

/// Errors returned to the caller of the engine.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("No active conversation for session {0}")]
    NoActiveSession(SessionId),

    #[error("Chat transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid dialogue transition: {0}")]
    InvalidTransition(#[from] ValidationError),

    #[error("Session is missing {0}")]
    MissingSessionData(&'static str),
}

/// The conversation state machine.
pub struct DialogueEngine {
    provider: Arc<dyn AIProvider>,
    prompt_log: Option<Arc<dyn PromptLog>>,
    catalog: Arc<ModeCatalog>,
    delivery: DeliveryPolicy,
    assembler: ResponseAssembler,
    extractor: FeedbackExtractor,
    settings: GenerationSettings,
    sessions: SessionStore,
}

impl DialogueEngine {
    /// Creates an engine without persistence, using default delivery limits.
    pub fn new(provider: Arc<dyn AIProvider>, catalog: Arc<ModeCatalog>) -> Self {
        Self {
            provider,
            prompt_log: None,
            catalog,
            delivery: DeliveryPolicy::default(),
            assembler: ResponseAssembler::new(),
            extractor: FeedbackExtractor::new(),
            settings: GenerationSettings::default(),
            sessions: SessionStore::new(),
        }
    }

    pub fn with_prompt_log(mut self, prompt_log: Arc<dyn PromptLog>) -> Self {
        self.prompt_log = Some(prompt_log);
        self
    }

    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery = policy;
        self
    }

    /// Bounds each generation, from opening the stream to draining it.
    pub fn with_stream_deadline(mut self, deadline: Duration) -> Self {
        self.assembler = self.assembler.with_deadline(deadline);
        self
    }

    pub fn with_generation_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Conversations without a turn for this long are dropped.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.sessions = self.sessions.with_idle_timeout(idle_timeout);
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.sessions.idle_timeout()
    }

    /// Drops abandoned conversations; returns how many were removed.
    pub async fn evict_idle_sessions(&self) -> usize {
        let evicted = self.sessions.evict_idle().await;
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle conversations");
        }
        evicted
    }

    pub fn catalog(&self) -> &ModeCatalog {
        &self.catalog
    }

    /// Starts (or restarts) the conversation and greets the user.
    pub async fn start(
        &self,
        session_id: SessionId,
        transport: &dyn ChatTransport,
    ) -> Result<DialogueState, DialogueError> {
        let handle = self.sessions.reset(session_id).await;
        let session = handle.lock().await;
        tracing::info!(session_id = %session_id, "Conversation started");

        let reply = Replier::new(transport, session_id);
        if let Err(e) = reply.text(replies::GREETING).await {
            tracing::error!(session_id = %session_id, error = %e, "Chat unavailable on start");
            drop(session);
            self.sessions.remove_if_current(session_id, &handle).await;
            return Err(e.into());
        }

        Ok(session.state())
    }

    /// Handles one user text turn.
    pub async fn handle_turn(
        &self,
        session_id: SessionId,
        text: &str,
        transport: &dyn ChatTransport,
    ) -> Result<DialogueState, DialogueError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(DialogueError::NoActiveSession(session_id))?;
        let mut session = handle.lock().await;
        if !session.state().is_active() {
            return Err(DialogueError::NoActiveSession(session_id));
        }
        session.touch();

        let from = session.state();
        let reply = Replier::new(transport, session_id);
        let outcome = self.dispatch(&mut session, text, &reply).await;

        if let Err(e) = &outcome {
            tracing::error!(
                session_id = %session_id,
                state = ?session.state(),
                error = %e,
                "Turn failed, ending conversation"
            );
            force_done(&mut session);
        }

        let to = session.state();
        tracing::debug!(session_id = %session_id, from = ?from, to = ?to, "Turn handled");

        if !to.is_active() {
            drop(session);
            self.sessions.remove_if_current(session_id, &handle).await;
        }

        outcome
    }

    /// Cancels the conversation. Checked between turns only; an in-flight
    /// turn finishes first.
    pub async fn cancel(
        &self,
        session_id: SessionId,
        transport: &dyn ChatTransport,
    ) -> Result<DialogueState, DialogueError> {
        let handle = self
            .sessions
            .get(session_id)
            .await
            .ok_or(DialogueError::NoActiveSession(session_id))?;
        let mut session = handle.lock().await;
        if !session.state().is_active() {
            return Err(DialogueError::NoActiveSession(session_id));
        }

        let state = session.advance(DialogueState::Cancelled)?;
        drop(session);
        self.sessions.remove_if_current(session_id, &handle).await;
        tracing::info!(session_id = %session_id, "Conversation cancelled");

        Replier::new(transport, session_id)
            .text(replies::CANCELLED)
            .await?;
        Ok(state)
    }

    /// Current state of an active conversation. Waits for an in-flight turn.
    pub async fn state_of(&self, session_id: SessionId) -> Option<DialogueState> {
        let handle = self.sessions.get(session_id).await?;
        let state = handle.lock().await.state();
        Some(state).filter(DialogueState::is_active)
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        match session.state() {
            DialogueState::AwaitingPrompt => self.on_prompt(session, text, reply).await,
            DialogueState::AwaitingMode => self.on_mode(session, text, reply).await,
            DialogueState::AwaitingFollowupConsent => {
                self.on_followup_consent(session, text, reply).await
            }
            DialogueState::AwaitingQuestionsText => self.on_questions(session, text, reply).await,
            DialogueState::AwaitingPreferencesText => {
                self.on_preferences(session, text, reply).await
            }
            DialogueState::AwaitingExplainConsent => {
                self.on_explain_consent(session, text, reply).await
            }
            DialogueState::Done | DialogueState::Cancelled => {
                Err(DialogueError::NoActiveSession(session.id()))
            }
        }
    }

    async fn on_prompt(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        session.set_raw_prompt(text);
        let next = session.advance(DialogueState::AwaitingMode)?;
        reply.text(replies::ASK_MODE).await?;
        Ok(next)
    }

    async fn on_mode(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        let Some(mode) = self.catalog.lookup(text).cloned() else {
            tracing::debug!(session_id = %session.id(), mode = text, "Unknown mode requested");
            reply
                .text(&replies::unknown_mode(text, self.catalog.keys()))
                .await?;
            return Ok(session.advance(DialogueState::AwaitingMode)?);
        };

        let raw_prompt = required(session.raw_prompt(), "raw prompt")?;
        session.set_mode(mode.clone());
        reply.text(replies::OPTIMIZING).await?;

        let request =
            requests::optimization_request(session.id(), &raw_prompt, &mode, &self.settings);
        let optimized = match self.assembler.generate(self.provider.as_ref(), request).await {
            Ok(assembled) => assembled.text,
            Err(failure) => {
                log_generation_failure(session.id(), requests::PURPOSE_OPTIMIZE, &failure);
                reply
                    .text(&replies::optimization_failed(&failure.source))
                    .await?;
                return Ok(session.advance(DialogueState::Done)?);
            }
        };

        session.set_optimized_text(optimized.as_str());
        let record_id = self
            .record_optimization(session.id(), &raw_prompt, &optimized, &mode)
            .await;
        session.set_record_id(record_id);

        reply.deliver(self.delivery.select(&optimized)).await?;

        if mode.is_deep_research() {
            let next = session.advance(DialogueState::AwaitingFollowupConsent)?;
            reply.text(replies::ASK_FOLLOWUP).await?;
            Ok(next)
        } else {
            let next = session.advance(DialogueState::AwaitingExplainConsent)?;
            reply.text(replies::ASK_EXPLANATION).await?;
            Ok(next)
        }
    }

    async fn on_followup_consent(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        if is_affirmative(text) {
            let next = session.advance(DialogueState::AwaitingQuestionsText)?;
            reply.text(replies::ASK_QUESTIONS).await?;
            Ok(next)
        } else {
            let next = session.advance(DialogueState::AwaitingExplainConsent)?;
            reply.text(replies::ASK_EXPLANATION).await?;
            Ok(next)
        }
    }

    async fn on_questions(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        session.begin_followup(text);
        let next = session.advance(DialogueState::AwaitingPreferencesText)?;
        reply.text(replies::ASK_PREFERENCES).await?;
        Ok(next)
    }

    async fn on_preferences(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        let preferences = if declines_preferences(text) { "" } else { text };
        session.set_preferences(preferences);

        let raw_prompt = required(session.raw_prompt(), "raw prompt")?;
        let optimized = required(session.optimized_text(), "optimized text")?;
        let questions = required(
            session.followup().map(|f| f.questions_asked.as_str()),
            "follow-up questions",
        )?;

        let request = requests::followup_request(
            session.id(),
            &raw_prompt,
            &optimized,
            &questions,
            preferences,
            &self.settings,
        );
        let answers = match self.assembler.generate(self.provider.as_ref(), request).await {
            Ok(assembled) => assembled.text,
            Err(failure) => {
                log_generation_failure(session.id(), requests::PURPOSE_FOLLOWUP, &failure);
                reply.text(replies::FOLLOWUP_FAILED).await?;
                return Ok(session.advance(DialogueState::Done)?);
            }
        };

        session.set_followup_text(answers.as_str());
        self.record_followup(FollowupRecord {
            record_id: session.record_id().clone(),
            questions_asked: questions,
            answers: answers.clone(),
            preferences: preferences.to_string(),
        })
        .await;

        reply.deliver(self.delivery.select(&answers)).await?;

        let next = session.advance(DialogueState::AwaitingExplainConsent)?;
        reply.text(replies::ASK_EXPLANATION).await?;
        Ok(next)
    }

    async fn on_explain_consent(
        &self,
        session: &mut Session,
        text: &str,
        reply: &Replier<'_>,
    ) -> Result<DialogueState, DialogueError> {
        if !is_affirmative(text) {
            let next = session.advance(DialogueState::Done)?;
            reply.text(replies::DONE).await?;
            return Ok(next);
        }

        let raw_prompt = required(session.raw_prompt(), "raw prompt")?;
        let optimized = required(session.optimized_text(), "optimized text")?;
        let mode = session
            .mode()
            .cloned()
            .ok_or(DialogueError::MissingSessionData("mode"))?;

        let request = requests::explanation_request(
            session.id(),
            &raw_prompt,
            &mode,
            &optimized,
            &self.settings,
        );
        let explanation = match self.assembler.generate(self.provider.as_ref(), request).await {
            Ok(assembled) => assembled.text,
            Err(failure) => {
                log_generation_failure(session.id(), requests::PURPOSE_EXPLAIN, &failure);
                reply.text(replies::EXPLANATION_FAILED).await?;
                return Ok(session.advance(DialogueState::Done)?);
            }
        };

        let next = session.advance(DialogueState::Done)?;

        match self.extractor.extract(&explanation) {
            Extraction::Found(feedback) => {
                self.record_explanation(session.record_id(), &feedback).await;
                for message in feedback_messages(&feedback) {
                    reply.send(&message, TextFormat::Markdown).await?;
                }
            }
            Extraction::NotFound => {
                tracing::debug!(
                    session_id = %session.id(),
                    "No structured feedback in explanation, sending raw text"
                );
                reply.deliver(self.delivery.select(&explanation)).await?;
            }
            Extraction::ParseError(details) => {
                tracing::warn!(
                    session_id = %session.id(),
                    details = %details,
                    "Malformed structured feedback in explanation, sending raw text"
                );
                reply.deliver(self.delivery.select(&explanation)).await?;
            }
        }

        Ok(next)
    }

    async fn record_optimization(
        &self,
        session_id: SessionId,
        raw_prompt: &str,
        optimized: &str,
        mode: &Mode,
    ) -> RecordId {
        let Some(log) = &self.prompt_log else {
            return RecordId::unrecorded();
        };

        let record = OptimizationRecord {
            original_prompt: raw_prompt.to_string(),
            optimized_prompt: optimized.to_string(),
            mode: mode.key().to_string(),
            model_used: self.provider.provider_info().model,
            session_id,
            created_at: Utc::now(),
        };

        match log.insert_optimization(&record).await {
            Ok(id) => {
                tracing::info!(session_id = %session_id, record_id = %id, "Optimization recorded");
                id
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to record optimization, continuing unrecorded"
                );
                RecordId::unrecorded()
            }
        }
    }

    async fn record_followup(&self, record: FollowupRecord) {
        let Some(log) = &self.prompt_log else {
            return;
        };
        if let Err(e) = log.insert_followup(&record).await {
            tracing::warn!(record_id = %record.record_id, error = %e, "Failed to record follow-up");
        }
    }

    async fn record_explanation(&self, record_id: &RecordId, feedback: &PromptFeedback) {
        let Some(log) = &self.prompt_log else {
            return;
        };
        if let Err(e) = log.insert_explanation(record_id, feedback).await {
            tracing::warn!(record_id = %record_id, error = %e, "Failed to record explanation");
        }
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, DialogueError> {
    value
        .map(str::to_string)
        .ok_or(DialogueError::MissingSessionData(field))
}

fn force_done(session: &mut Session) {
    if session.state().is_active() {
        if let Err(e) = session.advance(DialogueState::Done) {
            tracing::error!(session_id = %session.id(), error = %e, "Could not end conversation");
        }
    }
}

fn log_generation_failure(session_id: SessionId, purpose: &str, failure: &GenerationFailure) {
    tracing::warn!(
        session_id = %session_id,
        purpose,
        partial_chars = failure.partial.chars().count(),
        error = %failure.source,
        "Generation failed"
    );
}

/// Sends replies for one turn. Non-fatal send failures are logged and
/// swallowed; fatal ones are returned.
struct Replier<'a> {
    transport: &'a dyn ChatTransport,
    session_id: SessionId,
}

impl<'a> Replier<'a> {
    fn new(transport: &'a dyn ChatTransport, session_id: SessionId) -> Self {
        Self {
            transport,
            session_id,
        }
    }

    async fn text(&self, text: &str) -> Result<(), TransportError> {
        self.send(text, TextFormat::Plain).await
    }

    async fn send(&self, text: &str, format: TextFormat) -> Result<(), TransportError> {
        let result = self.transport.send_text(self.session_id, text, format).await;
        self.tolerate(result)
    }

    async fn deliver(&self, delivery: Delivery) -> Result<(), TransportError> {
        tracing::debug!(
            session_id = %self.session_id,
            messages = delivery.message_count(),
            "Delivering generated text"
        );
        match delivery {
            Delivery::Inline(text) => self.text(&text).await,
            Delivery::Chunked(chunks) => {
                for chunk in &chunks {
                    self.text(chunk).await?;
                }
                Ok(())
            }
            Delivery::AttachedFile { content, filename } => {
                let result = self
                    .transport
                    .send_file(self.session_id, content.as_bytes(), &filename)
                    .await;
                self.tolerate(result)
            }
        }
    }

    fn tolerate(&self, result: Result<(), TransportError>) -> Result<(), TransportError> {
        match result {
            Err(e) if !e.is_fatal() => {
                tracing::warn!(session_id = %self.session_id, error = %e, "Failed to send reply");
                Ok(())
            }
            other => other,
        }
    }
}

//! Typed per-conversation session record.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

use crate::domain::foundation::{RecordId, SessionId, StateMachine, ValidationError};
use crate::domain::optimizer::Mode;

use super::DialogueState;

/// Data collected by the deep-research follow-up sub-flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowupData {
    /// Questions the downstream model asked, as pasted by the user.
    pub questions_asked: String,
    /// Preferences or answers; empty when the user replied "no".
    pub preferences: Option<String>,
    /// Generated follow-up answers.
    pub followup_text: Option<String>,
}

/// One user's conversation state.
///
/// Fields are filled in by the dialogue handlers as the conversation
/// advances; `state` only moves along edges of [`DialogueState`].
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    state: DialogueState,
    raw_prompt: Option<String>,
    mode: Option<Mode>,
    optimized_text: Option<String>,
    record_id: RecordId,
    followup: Option<FollowupData>,
    started_at: DateTime<Utc>,
    last_active: Instant,
}

impl Session {
    /// Creates a session in its initial state.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: DialogueState::default(),
            raw_prompt: None,
            mode: None,
            optimized_text: None,
            record_id: RecordId::unrecorded(),
            followup: None,
            started_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Marks the session as used by the current turn.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the session was created or last touched.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// Moves to `target`, rejecting edges the state machine does not define.
    pub fn advance(&mut self, target: DialogueState) -> Result<DialogueState, ValidationError> {
        self.state = self.state.transition_to(target)?;
        Ok(self.state)
    }

    pub fn raw_prompt(&self) -> Option<&str> {
        self.raw_prompt.as_deref()
    }

    /// Stores the raw prompt, starting a new optimization cycle.
    pub fn set_raw_prompt(&mut self, prompt: impl Into<String>) {
        self.raw_prompt = Some(prompt.into());
        self.optimized_text = None;
        self.followup = None;
    }

    pub fn mode(&self) -> Option<&Mode> {
        self.mode.as_ref()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = Some(mode);
    }

    /// Latest completed optimization result.
    pub fn optimized_text(&self) -> Option<&str> {
        self.optimized_text.as_deref()
    }

    pub fn set_optimized_text(&mut self, text: impl Into<String>) {
        self.optimized_text = Some(text.into());
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn set_record_id(&mut self, record_id: RecordId) {
        self.record_id = record_id;
    }

    pub fn followup(&self) -> Option<&FollowupData> {
        self.followup.as_ref()
    }

    /// Enters the follow-up sub-flow with the questions the model asked.
    pub fn begin_followup(&mut self, questions_asked: impl Into<String>) {
        self.followup = Some(FollowupData {
            questions_asked: questions_asked.into(),
            preferences: None,
            followup_text: None,
        });
    }

    /// Records preferences. Does nothing outside the follow-up sub-flow.
    pub fn set_preferences(&mut self, preferences: impl Into<String>) {
        if let Some(followup) = self.followup.as_mut() {
            followup.preferences = Some(preferences.into());
        }
    }

    /// Records generated follow-up answers. Does nothing outside the follow-up sub-flow.
    pub fn set_followup_text(&mut self, text: impl Into<String>) {
        if let Some(followup) = self.followup.as_mut() {
            followup.followup_text = Some(text.into());
        }
    }
}

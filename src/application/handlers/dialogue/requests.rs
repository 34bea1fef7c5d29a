//! Completion requests for the three generation purposes.

use uuid::Uuid;

use crate::domain::foundation::SessionId;
use crate::domain::optimizer::{templates, Mode};
use crate::ports::{CompletionRequest, MessageRole, RequestMetadata};

pub const PURPOSE_OPTIMIZE: &str = "optimize";
pub const PURPOSE_FOLLOWUP: &str = "followup";
pub const PURPOSE_EXPLAIN: &str = "explain";

/// Sampling settings applied to every request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationSettings {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationSettings {
    fn apply(&self, mut request: CompletionRequest) -> CompletionRequest {
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

fn metadata(session_id: SessionId, purpose: &'static str) -> RequestMetadata {
    RequestMetadata::new(session_id, purpose, Uuid::new_v4().to_string())
}

/// Rewrites `raw_prompt` in `mode`.
pub fn optimization_request(
    session_id: SessionId,
    raw_prompt: &str,
    mode: &Mode,
    settings: &GenerationSettings,
) -> CompletionRequest {
    let request = CompletionRequest::new(metadata(session_id, PURPOSE_OPTIMIZE))
        .with_system_prompt(templates::optimization_system_prompt(mode))
        .with_message(MessageRole::User, templates::optimization_user_turn(raw_prompt));
    settings.apply(request)
}

/// Replays the deep-research exchange and asks for answers to the
/// downstream model's questions.
pub fn followup_request(
    session_id: SessionId,
    raw_prompt: &str,
    optimized_text: &str,
    questions_asked: &str,
    preferences: &str,
    settings: &GenerationSettings,
) -> CompletionRequest {
    let request = CompletionRequest::new(metadata(session_id, PURPOSE_FOLLOWUP))
        .with_system_prompt(templates::followup_system_prompt())
        .with_message(MessageRole::User, templates::optimization_user_turn(raw_prompt))
        .with_message(MessageRole::Assistant, optimized_text)
        .with_message(
            MessageRole::User,
            templates::followup_user_turn(questions_asked, preferences),
        );
    settings.apply(request)
}

/// Asks for a structured critique of the rewrite.
pub fn explanation_request(
    session_id: SessionId,
    raw_prompt: &str,
    mode: &Mode,
    optimized_text: &str,
    settings: &GenerationSettings,
) -> CompletionRequest {
    let request = CompletionRequest::new(metadata(session_id, PURPOSE_EXPLAIN))
        .with_system_prompt(templates::explanation_system_prompt())
        .with_message(
            MessageRole::User,
            templates::explanation_request(raw_prompt, mode, optimized_text),
        );
    settings.apply(request)
}

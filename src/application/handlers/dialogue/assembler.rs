//! Response assembly.
//!
//! Drains a [`GenerationStream`] into one string. Fragments are appended in
//! emission order and the stream is read to its end before anything is
//! returned, so a caller never observes a half-finished result as success.

use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::ports::{AIError, AIProvider, CompletionRequest, GenerationStream, TokenUsage};

/// Generation failed or was interrupted mid-stream.
///
/// `partial` holds whatever text arrived before the failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("generation failed after {} characters: {source}", .partial.chars().count())]
pub struct GenerationFailure {
    pub partial: String,
    #[source]
    pub source: AIError,
}

impl GenerationFailure {
    pub fn new(partial: impl Into<String>, source: AIError) -> Self {
        Self {
            partial: partial.into(),
            source,
        }
    }

    /// Failure before any fragment was produced.
    pub fn before_stream(source: AIError) -> Self {
        Self::new(String::new(), source)
    }
}

/// A fully drained generation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledText {
    pub text: String,
    pub fragments: usize,
    pub usage: Option<TokenUsage>,
}

/// Concatenates stream fragments, optionally under an overall deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseAssembler {
    deadline: Option<Duration>,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the time from opening the stream to reading its end.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Opens a stream for `request` and drains it.
    pub async fn generate(
        &self,
        provider: &dyn AIProvider,
        request: CompletionRequest,
    ) -> Result<AssembledText, GenerationFailure> {
        self.generate_with_progress(provider, request, |_| {}).await
    }

    /// Like [`generate`](Self::generate), calling `on_fragment` with each
    /// fragment as it arrives.
    pub async fn generate_with_progress<F>(
        &self,
        provider: &dyn AIProvider,
        request: CompletionRequest,
        on_fragment: F,
    ) -> Result<AssembledText, GenerationFailure>
    where
        F: FnMut(&str),
    {
        let deadline = self.deadline.map(|d| (Instant::now() + d, d));

        let opened = match deadline {
            Some((at, limit)) => match tokio::time::timeout_at(at, provider.stream_complete(request)).await {
                Ok(result) => result,
                Err(_) => Err(AIError::timeout(limit.as_secs())),
            },
            None => provider.stream_complete(request).await,
        };
        let stream = opened.map_err(GenerationFailure::before_stream)?;

        self.drain(stream, deadline, on_fragment).await
    }

    /// Drains an already opened stream.
    pub async fn assemble(&self, stream: GenerationStream) -> Result<AssembledText, GenerationFailure> {
        self.assemble_with_progress(stream, |_| {}).await
    }

    /// Drains an already opened stream, calling `on_fragment` per fragment.
    pub async fn assemble_with_progress<F>(
        &self,
        stream: GenerationStream,
        on_fragment: F,
    ) -> Result<AssembledText, GenerationFailure>
    where
        F: FnMut(&str),
    {
        let deadline = self.deadline.map(|d| (Instant::now() + d, d));
        self.drain(stream, deadline, on_fragment).await
    }

    async fn drain<F>(
        &self,
        mut stream: GenerationStream,
        deadline: Option<(Instant, Duration)>,
        mut on_fragment: F,
    ) -> Result<AssembledText, GenerationFailure>
    where
        F: FnMut(&str),
    {
        let mut text = String::new();
        let mut fragments = 0;
        let mut usage = None;

        loop {
            let next = match deadline {
                Some((at, limit)) => match tokio::time::timeout_at(at, stream.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        return Err(GenerationFailure::new(text, AIError::timeout(limit.as_secs())))
                    }
                },
                None => stream.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    if !chunk.delta.is_empty() {
                        on_fragment(&chunk.delta);
                        text.push_str(&chunk.delta);
                        fragments += 1;
                    }
                    if chunk.usage.is_some() {
                        usage = chunk.usage;
                    }
                }
                Some(Err(e)) => return Err(GenerationFailure::new(text, e)),
                None => break,
            }
        }

        if let Some(usage) = &usage {
            tracing::debug!(
                fragments,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation stream drained"
            );
        }

        Ok(AssembledText {
            text,
            fragments,
            usage,
        })
    }
}

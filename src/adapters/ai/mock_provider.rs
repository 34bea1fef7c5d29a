//! Mock AI Provider for testing.
//!
//! A configurable implementation of the AIProvider port, so dialogue tests
//! run without calling a real LLM.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Exact fragment control for assembly tests
//! - Error injection, both before and during streaming
//! - Simulated latency for deadline tests
//! - Call recording for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("An optimized prompt")
//!     .with_interrupted(vec!["partial "], AIError::network("reset"));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, FinishReason, GenerationStream, ProviderInfo,
    StreamChunk, TokenUsage,
};

/// Text returned once the queue is exhausted.
pub const DEFAULT_MOCK_RESPONSE: &str = "Mock response";

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these fragments, then a closing chunk.
    Fragments(Vec<String>),
    /// Stream these fragments, then fail with the error.
    Interrupted {
        emitted: Vec<String>,
        error: AIError,
    },
    /// Fail before any stream is returned.
    Error(AIError),
}

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Latency before the stream is returned and between fragments.
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response, streamed word by word.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        let content = content.into();
        let fragments = content.split_inclusive(' ').map(str::to_string).collect();
        self.push(MockResponse::Fragments(fragments))
    }

    /// Queues a successful response made of exactly these fragments.
    pub fn with_fragments<S: Into<String>>(self, fragments: impl IntoIterator<Item = S>) -> Self {
        let fragments = fragments.into_iter().map(Into::into).collect();
        self.push(MockResponse::Fragments(fragments))
    }

    /// Queues a stream that emits `emitted` and then fails.
    pub fn with_interrupted<S: Into<String>>(
        self,
        emitted: impl IntoIterator<Item = S>,
        error: AIError,
    ) -> Self {
        let emitted = emitted.into_iter().map(Into::into).collect();
        self.push(MockResponse::Interrupted { emitted, error })
    }

    /// Queues a failure to establish the stream.
    pub fn with_error(self, error: AIError) -> Self {
        self.push(MockResponse::Error(error))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Number of `stream_complete` calls so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// All recorded requests, oldest first.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Responses still queued.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Fragments(vec![DEFAULT_MOCK_RESPONSE.to_string()]))
    }

    fn fragment_stream(&self, fragments: Vec<String>) -> GenerationStream {
        let delay = self.delay;
        Box::pin(stream::iter(fragments).then(move |fragment| async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            Ok::<_, AIError>(StreamChunk::content(fragment))
        }))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<GenerationStream, AIError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Fragments(fragments) => {
                let completion_tokens = fragments.len() as u32;
                let closing = stream::once(async move {
                    Ok(StreamChunk::final_chunk(
                        FinishReason::Stop,
                        Some(TokenUsage::new(10, completion_tokens)),
                    ))
                });
                Ok(Box::pin(self.fragment_stream(fragments).chain(closing)))
            }
            MockResponse::Interrupted { emitted, error } => {
                let failure = stream::once(async move { Err(error) });
                Ok(Box::pin(self.fragment_stream(emitted).chain(failure)))
            }
            MockResponse::Error(error) => Err(error),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

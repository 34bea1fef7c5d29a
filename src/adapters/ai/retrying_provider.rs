//! Retrying AI Provider - bounded retry with jittered backoff.
//!
//! Only stream *establishment* is retried. Once fragments have been handed
//! out the stream is non-restartable, so a mid-stream failure is passed
//! through to the caller unchanged.
//!
//! # Example
//!
//! ```ignore
//! let provider = RetryingProvider::new(OpenAIProvider::new(config)?)
//!     .with_policy(RetryPolicy::new(3, Duration::from_millis(500)));
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AIProvider, CompletionRequest, GenerationStream, ProviderInfo};

/// Backoff schedule for retries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction of the delay added or removed at random (0.0 disables jitter).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor.clamp(0.0, 1.0);
        self
    }

    /// Delay before retry number `attempt` (0-based):
    /// `min(base * 2^attempt, max) * (1 ± jitter)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);

        if self.jitter_factor > 0.0 {
            let spread = (rand::random::<f64>() * 2.0 - 1.0) * self.jitter_factor;
            capped.mul_f64((1.0 + spread).max(0.0))
        } else {
            capped
        }
    }

    /// Delay before retrying after `error`. Rate limits use the provider's
    /// hint, bounded by `max_delay`.
    fn delay_after(&self, error: &AIError, attempt: u32) -> Duration {
        match error {
            AIError::RateLimited { retry_after_secs } => {
                Duration::from_secs(u64::from(*retry_after_secs)).min(self.max_delay)
            }
            _ => self.delay_for(attempt),
        }
    }
}

/// Wraps a provider and retries transient establishment failures.
pub struct RetryingProvider<P: AIProvider> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: AIProvider> RetryingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl<P: AIProvider + 'static> AIProvider for RetryingProvider<P> {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<GenerationStream, AIError> {
        let mut attempt = 0;

        loop {
            match self.inner.stream_complete(request.clone()).await {
                Ok(stream) => return Ok(stream),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_after(&err, attempt);
                    tracing::warn!(
                        session_id = %request.metadata.session_id,
                        purpose = request.metadata.purpose,
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Generation stream failed to open, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}

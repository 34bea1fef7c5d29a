//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - Any OpenAI-compatible chat completions endpoint (Gemini by default)
//! - `RetryingProvider` - Wrapper with bounded, jittered retry of stream establishment
//! - `MockAIProvider` - Configurable mock for testing

mod mock_provider;
mod openai_provider;
mod retrying_provider;

pub use mock_provider::{MockAIProvider, MockResponse, DEFAULT_MOCK_RESPONSE};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use retrying_provider::{RetryPolicy, RetryingProvider};

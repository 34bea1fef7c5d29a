//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the dialogue and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - streaming text generation
//! - `ChatTransport` - outbound messages to the user
//! - `PromptLog` - best-effort persistence of results

mod ai_provider;
mod chat_transport;
mod prompt_log;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, FinishReason, GenerationStream, Message, MessageRole,
    ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
pub use chat_transport::{ChatTransport, TextFormat, TransportError};
pub use prompt_log::{FollowupRecord, OptimizationRecord, PersistenceError, PromptLog};

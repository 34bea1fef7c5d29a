//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Streaming LLM providers (OpenAI-compatible, retrying wrapper, mock)
//! - `http` - Axum chat endpoints
//! - `postgres` - PostgreSQL prompt log
//! - `storage` - In-memory prompt log

pub mod ai;
pub mod http;
pub mod postgres;
pub mod storage;

//! Storage Adapters
//!
//! In-process implementations of the PromptLog port.
//!
//! ## Available Adapters
//!
//! - **InMemoryPromptLog** - Keeps records in memory (testing/development)
//!
//! The database-backed log lives in `adapters::postgres`.

mod in_memory_prompt_log;

pub use in_memory_prompt_log::InMemoryPromptLog;

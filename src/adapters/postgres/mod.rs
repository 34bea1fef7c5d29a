//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresPromptLog` - Optimization, follow-up and explanation records

mod prompt_log;

pub use prompt_log::PostgresPromptLog;

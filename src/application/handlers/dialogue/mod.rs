//! Dialogue handlers.
//!
//! The conversation state machine and the pieces it drives: response
//! assembly, request building and the per-conversation session store.

mod assembler;
mod engine;
mod requests;
mod session_store;

pub use assembler::{AssembledText, GenerationFailure, ResponseAssembler};
pub use engine::{DialogueEngine, DialogueError};
pub use requests::{
    explanation_request, followup_request, optimization_request, GenerationSettings,
    PURPOSE_EXPLAIN, PURPOSE_FOLLOWUP, PURPOSE_OPTIMIZE,
};
pub use session_store::{SessionHandle, SessionStore};

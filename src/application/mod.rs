//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AssembledText, DialogueEngine, DialogueError, GenerationFailure, GenerationSettings,
    ResponseAssembler, SessionStore,
};

//! Application handlers.
//!
//! Orchestrate domain logic and the ports for each inbound chat event.

pub mod dialogue;

pub use dialogue::{
    AssembledText, DialogueEngine, DialogueError, GenerationFailure, GenerationSettings,
    ResponseAssembler, SessionStore,
};

//! Domain layer containing the prompt optimization logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `dialogue` - Conversation states, typed session record, reply texts
//! - `delivery` - Choosing inline, chunked or attached delivery of a result
//! - `feedback` - Structured feedback extraction and rendering
//! - `optimizer` - Mode catalog and generation instruction templates

pub mod delivery;
pub mod dialogue;
pub mod feedback;
pub mod foundation;
pub mod optimizer;

//! Dialogue domain module.
//!
//! The conversation phases, the typed session record, the rules for
//! reading yes/no replies and the texts shown to the user.

mod consent;
pub mod replies;
mod session;
mod state;

pub use consent::{declines_preferences, is_affirmative};
pub use session::{FollowupData, Session};
pub use state::DialogueState;

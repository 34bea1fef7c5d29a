//! State machine trait for finite state enums.
//!
//! Implementors list their outgoing edges once and get a validated
//! `transition_to` plus terminal-state detection.

use super::ValidationError;

/// Trait for enums that model a finite state machine.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for DialogueState {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             AwaitingPrompt => vec![AwaitingMode, Done, Cancelled],
///             // ... etc
///         }
///     }
/// }
///
/// let next = current.transition_to(DialogueState::AwaitingMode)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if a transition from self to target is allowed.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs the transition, returning an error if the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::illegal_transition(self, target))
        }
    }

    /// Checks if the current state has no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

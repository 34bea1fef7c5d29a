//! Dialogue state machine.
//!
//! Defines the phases of a prompt optimization conversation and the
//! transitions allowed between them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The phase a conversation is in, i.e. what the next user turn means.
///
/// Conversations move through these states from the start signal on:
/// - `AwaitingPrompt`: the next text is the raw prompt
/// - `AwaitingMode`: the next text names a mode; triggers the optimization cycle
/// - `AwaitingFollowupConsent`: deep-research only, asks whether to answer questions
/// - `AwaitingQuestionsText`: the next text is the questions the model asked
/// - `AwaitingPreferencesText`: the next text is the user's preferences (or "no")
/// - `AwaitingExplainConsent`: asks whether to explain the optimization
/// - `Done` / `Cancelled`: terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    /// Greeting sent, waiting for the raw prompt.
    #[default]
    AwaitingPrompt,

    /// Raw prompt stored, waiting for the mode key.
    AwaitingMode,

    /// Deep-research result delivered, waiting for yes/no on follow-up.
    AwaitingFollowupConsent,

    /// Waiting for the questions the downstream model asked.
    AwaitingQuestionsText,

    /// Waiting for preferences or answers to those questions.
    AwaitingPreferencesText,

    /// Waiting for yes/no on the explanation.
    AwaitingExplainConsent,

    /// Dialogue finished normally or aborted after a failure.
    Done,

    /// Dialogue cancelled by the user.
    Cancelled,
}

impl DialogueState {
    /// Returns true if the conversation still accepts user turns.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Done | Self::Cancelled)
    }
}

impl StateMachine for DialogueState {
    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueState::*;
        match self {
            AwaitingPrompt => vec![AwaitingMode, Done, Cancelled],
            // Unknown mode keys re-prompt, so the state may loop on itself
            AwaitingMode => vec![
                AwaitingMode,
                AwaitingFollowupConsent,
                AwaitingExplainConsent,
                Done,
                Cancelled,
            ],
            AwaitingFollowupConsent => {
                vec![AwaitingQuestionsText, AwaitingExplainConsent, Done, Cancelled]
            }
            AwaitingQuestionsText => vec![AwaitingPreferencesText, Done, Cancelled],
            AwaitingPreferencesText => vec![AwaitingExplainConsent, Done, Cancelled],
            AwaitingExplainConsent => vec![Done, Cancelled],
            Done | Cancelled => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DialogueState; 8] = [
        DialogueState::AwaitingPrompt,
        DialogueState::AwaitingMode,
        DialogueState::AwaitingFollowupConsent,
        DialogueState::AwaitingQuestionsText,
        DialogueState::AwaitingPreferencesText,
        DialogueState::AwaitingExplainConsent,
        DialogueState::Done,
        DialogueState::Cancelled,
    ];

    mod state_definition {
        use super::*;

        #[test]
        fn default_state_is_awaiting_prompt() {
            assert_eq!(DialogueState::default(), DialogueState::AwaitingPrompt);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&DialogueState::AwaitingFollowupConsent).unwrap();
            assert_eq!(json, "\"awaiting_followup_consent\"");
        }

        #[test]
        fn deserializes_from_snake_case() {
            let state: DialogueState = serde_json::from_str("\"awaiting_mode\"").unwrap();
            assert_eq!(state, DialogueState::AwaitingMode);
        }
    }

    mod state_machine_trait {
        use super::*;

        #[test]
        fn happy_path_edges_exist() {
            use DialogueState::*;
            assert!(AwaitingPrompt.can_transition_to(&AwaitingMode));
            assert!(AwaitingMode.can_transition_to(&AwaitingExplainConsent));
            assert!(AwaitingMode.can_transition_to(&AwaitingFollowupConsent));
            assert!(AwaitingFollowupConsent.can_transition_to(&AwaitingQuestionsText));
            assert!(AwaitingQuestionsText.can_transition_to(&AwaitingPreferencesText));
            assert!(AwaitingPreferencesText.can_transition_to(&AwaitingExplainConsent));
            assert!(AwaitingExplainConsent.can_transition_to(&Done));
        }

        #[test]
        fn prompt_cannot_skip_to_explanation() {
            assert!(!DialogueState::AwaitingPrompt
                .can_transition_to(&DialogueState::AwaitingExplainConsent));
        }

        #[test]
        fn every_active_state_can_be_cancelled_or_aborted() {
            for state in ALL.iter().filter(|s| s.is_active()) {
                assert!(state.can_transition_to(&DialogueState::Cancelled), "{:?}", state);
                assert!(state.can_transition_to(&DialogueState::Done), "{:?}", state);
            }
        }

        #[test]
        fn terminal_states_have_no_transitions() {
            assert!(DialogueState::Done.is_terminal());
            assert!(DialogueState::Cancelled.is_terminal());
            assert!(DialogueState::Done
                .transition_to(DialogueState::AwaitingPrompt)
                .is_err());
        }

        #[test]
        fn is_active_matches_is_terminal() {
            for state in ALL {
                assert_eq!(state.is_active(), !state.is_terminal(), "{:?}", state);
            }
        }
    }
}

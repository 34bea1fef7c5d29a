//! Domain validation errors.

use std::fmt::Debug;
use thiserror::Error;

/// A value or state change the domain refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: String },

    #[error("{field} {reason}")]
    Rejected { field: String, reason: String },

    #[error("no transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}

impl ValidationError {
    pub fn blank(field: impl Into<String>) -> Self {
        ValidationError::Blank { field: field.into() }
    }

    pub fn rejected(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Rejected {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Names both states by their `Debug` form.
    pub fn illegal_transition(from: impl Debug, to: impl Debug) -> Self {
        ValidationError::IllegalTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_reads_as_a_sentence() {
        let err = ValidationError::rejected("max_chunks", "must be greater than zero");
        assert_eq!(err.to_string(), "max_chunks must be greater than zero");
    }

    #[test]
    fn illegal_transition_names_both_states() {
        #[derive(Debug)]
        enum Light {
            Red,
            Green,
        }
        let err = ValidationError::illegal_transition(Light::Red, Light::Green);
        assert_eq!(err.to_string(), "no transition from Red to Green");
    }
}

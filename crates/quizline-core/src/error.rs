//! Session error types.
//!
//! Every variant is a local validation failure. None of them is worth
//! retrying: the presentation layer should prevent them by construction and
//! surface any that slip through as a programming error.

use thiserror::Error;

use crate::model::OptionLabel;
use crate::session::SessionState;

/// Errors raised by the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// A session cannot start with no questions.
    #[error("cannot start a session with an empty question set")]
    EmptySet,

    /// A mutating operation was attempted on a finished session.
    #[error("operation not allowed in state {state}")]
    InvalidState { state: SessionState },

    /// Navigation target is outside the question set.
    #[error("question index {index} out of range (set has {len} questions)")]
    OutOfRange { index: usize, len: usize },

    /// `go_previous` on the first question.
    #[error("already at the first question")]
    AtFirstQuestion,

    /// `go_next` on the last question.
    #[error("already at the last question")]
    AtLastQuestion,

    /// The label is not one of the question's options.
    #[error("option {label} is not available for question {question_id}")]
    InvalidOption { question_id: u32, label: OptionLabel },

    /// The question id does not belong to this session's set.
    #[error("question {0} is not part of this session")]
    UnknownQuestion(u32),

    /// Scoring was requested before the session ended.
    #[error("session has not been submitted or timed out yet")]
    NotTerminal,
}

impl QuizError {
    /// Returns `true` for errors caused by a bad user choice that a front end
    /// can report and keep going (as opposed to integration bugs).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            QuizError::OutOfRange { .. }
                | QuizError::AtFirstQuestion
                | QuizError::AtLastQuestion
                | QuizError::InvalidOption { .. }
                | QuizError::UnknownQuestion(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = QuizError::OutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "question index 7 out of range (set has 3 questions)"
        );

        let err = QuizError::InvalidOption {
            question_id: 12,
            label: OptionLabel::E,
        };
        assert!(err.to_string().contains("option E"));
        assert!(err.to_string().contains("question 12"));
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(QuizError::OutOfRange { index: 0, len: 0 }.is_input_error());
        assert!(QuizError::UnknownQuestion(1).is_input_error());
        assert!(QuizError::AtFirstQuestion.is_input_error());
        assert!(QuizError::AtLastQuestion.is_input_error());
        assert!(!QuizError::NotTerminal.is_input_error());
        assert!(!QuizError::InvalidState {
            state: SessionState::Submitted
        }
        .is_input_error());
    }
}

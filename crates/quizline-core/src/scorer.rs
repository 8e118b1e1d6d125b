//! Scoring of finished sessions.

use serde::Serialize;

use crate::error::QuizError;
use crate::model::{OptionLabel, Question};
use crate::session::{Session, SessionState};

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub question: Question,
    pub submitted: Option<OptionLabel>,
    pub correct: OptionLabel,
    pub is_correct: bool,
}

/// Aggregate result of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    /// `Submitted` or `TimedOut`.
    pub state: SessionState,
    pub correct_count: usize,
    pub total: usize,
    /// `100 * correct_count / total`, unrounded.
    pub percentage: f64,
    /// Outcomes in question-set order.
    pub outcomes: Vec<QuestionOutcome>,
}

/// Score a session that has been submitted or has timed out.
///
/// Unanswered questions count as incorrect.
pub fn score(session: &Session) -> Result<QuizResult, QuizError> {
    if !session.state().is_terminal() {
        return Err(QuizError::NotTerminal);
    }

    let outcomes: Vec<QuestionOutcome> = session
        .question_set()
        .iter()
        .map(|q| {
            let submitted = session.answer_for(q.id());
            QuestionOutcome {
                question: q.clone(),
                submitted,
                correct: q.correct(),
                is_correct: submitted == Some(q.correct()),
            }
        })
        .collect();

    let total = outcomes.len();
    let correct_count = outcomes.iter().filter(|o| o.is_correct).count();
    let percentage = if total == 0 {
        0.0
    } else {
        100.0 * correct_count as f64 / total as f64
    };

    Ok(QuizResult {
        state: session.state(),
        correct_count,
        total,
        percentage,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::question_set;
    use crate::model::OptionLabel::*;
    use crate::session::default_duration;
    use chrono::{DateTime, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn scoring_in_progress_fails() {
        let s = Session::start(question_set(&[A]), default_duration(), t0()).unwrap();
        assert_eq!(score(&s).unwrap_err(), QuizError::NotTerminal);
    }

    #[test]
    fn partial_submission() {
        let mut s = Session::start(question_set(&[A, B, C]), default_duration(), t0()).unwrap();
        s.record_answer(1, A).unwrap();
        s.record_answer(2, C).unwrap();
        s.submit().unwrap();

        let result = score(&s).unwrap();
        assert_eq!(result.state, SessionState::Submitted);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.total, 3);
        assert!((result.percentage - 100.0 / 3.0).abs() < 1e-9);

        let flags: Vec<bool> = result.outcomes.iter().map(|o| o.is_correct).collect();
        assert_eq!(flags, vec![true, false, false]);
        assert_eq!(result.outcomes[1].submitted, Some(C));
        assert_eq!(result.outcomes[1].correct, B);
        assert_eq!(result.outcomes[2].submitted, None);
    }

    #[test]
    fn timed_out_sessions_are_scored() {
        let mut s = Session::start(question_set(&[D, D]), default_duration(), t0()).unwrap();
        s.record_answer(2, D).unwrap();
        s.check_timeout(s.deadline());

        let result = score(&s).unwrap();
        assert_eq!(result.state, SessionState::TimedOut);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn nothing_answered_scores_zero() {
        let mut s = Session::start(question_set(&[A, B]), default_duration(), t0()).unwrap();
        s.submit().unwrap();
        let result = score(&s).unwrap();
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn score_ignores_navigation_history() {
        let mut a = Session::start(question_set(&[A, B, C]), default_duration(), t0()).unwrap();
        a.record_answer(3, C).unwrap();
        a.record_answer(1, A).unwrap();
        a.submit().unwrap();

        let mut b = Session::start(question_set(&[A, B, C]), default_duration(), t0()).unwrap();
        b.go_to(2).unwrap();
        b.answer_current(C).unwrap();
        b.go_to(0).unwrap();
        b.answer_current(A).unwrap();
        b.go_to(1).unwrap();
        b.submit().unwrap();

        assert_eq!(score(&a).unwrap(), score(&b).unwrap());
        assert_eq!(score(&a).unwrap(), score(&a).unwrap());
    }
}

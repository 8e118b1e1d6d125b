//! The quiz session state machine.
//!
//! A [`Session`] owns one question set, the answers recorded so far, the
//! current position and the timing window. It moves from `InProgress` to
//! exactly one terminal state:
//!
//! - `Submitted` when the user calls [`Session::submit`];
//! - `TimedOut` when [`Session::check_timeout`] observes that the window has
//!   elapsed.
//!
//! The clock is never read here. Callers pass `now` in, which keeps every
//! time-dependent answer a pure function of the session and that instant.
//! Expiry is cooperative: `remaining_time` hitting zero changes nothing until
//! someone calls `check_timeout`. A `submit` handled before that call wins.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::{OptionLabel, Question, QuestionSet};

/// Default time allowed for a session.
pub fn default_duration() -> Duration {
    Duration::minutes(60)
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Submitted,
    TimedOut,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::InProgress)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::InProgress => write!(f, "in progress"),
            SessionState::Submitted => write!(f, "submitted"),
            SessionState::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Selected option per question id. Absent means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerRecord(BTreeMap<u32, OptionLabel>);

impl AnswerRecord {
    pub fn get(&self, question_id: u32) -> Option<OptionLabel> {
        self.0.get(&question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, OptionLabel)> + '_ {
        self.0.iter().map(|(&id, &label)| (id, label))
    }

    fn set(&mut self, question_id: u32, label: OptionLabel) -> Option<OptionLabel> {
        self.0.insert(question_id, label)
    }
}

/// Answered/unanswered counts for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
}

/// One user's attempt at a question set.
#[derive(Debug, Clone)]
pub struct Session {
    set: QuestionSet,
    answers: AnswerRecord,
    current: usize,
    started_at: DateTime<Utc>,
    duration: Duration,
    state: SessionState,
}

impl Session {
    /// Start a session at `now`. Negative durations are treated as zero.
    pub fn start(
        set: QuestionSet,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if set.is_empty() {
            return Err(QuizError::EmptySet);
        }
        let duration = duration.max(Duration::zero());
        tracing::info!(
            "session started: {} questions, {}s allowed",
            set.len(),
            duration.num_seconds()
        );
        Ok(Self {
            set,
            answers: AnswerRecord::default(),
            current: 0,
            started_at: now,
            duration,
            state: SessionState::InProgress,
        })
    }

    fn ensure_in_progress(&self) -> Result<(), QuizError> {
        if self.state.is_terminal() {
            return Err(QuizError::InvalidState { state: self.state });
        }
        Ok(())
    }

    /// Jump to any question. The index is left unchanged on failure.
    pub fn go_to(&mut self, index: usize) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        if index >= self.set.len() {
            return Err(QuizError::OutOfRange {
                index,
                len: self.set.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    pub fn go_next(&mut self) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        if self.current + 1 >= self.set.len() {
            return Err(QuizError::AtLastQuestion);
        }
        self.current += 1;
        Ok(())
    }

    pub fn go_previous(&mut self) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        self.current = self
            .current
            .checked_sub(1)
            .ok_or(QuizError::AtFirstQuestion)?;
        Ok(())
    }

    /// Record (or overwrite) the answer for a question.
    pub fn record_answer(&mut self, question_id: u32, label: OptionLabel) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        let question = self
            .set
            .find(question_id)
            .ok_or(QuizError::UnknownQuestion(question_id))?;
        if !question.has_option(label) {
            return Err(QuizError::InvalidOption { question_id, label });
        }
        if let Some(previous) = self.answers.set(question_id, label) {
            tracing::debug!("question {question_id}: answer changed {previous} -> {label}");
        }
        Ok(())
    }

    /// Record an answer for the question currently shown.
    pub fn answer_current(&mut self, label: OptionLabel) -> Result<(), QuizError> {
        let id = self.current_question().id();
        self.record_answer(id, label)
    }

    /// Time left at `now`, never negative.
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = (now - self.started_at).max(Duration::zero());
        (self.duration - elapsed).max(Duration::zero())
    }

    /// End the session if its time is up. Calling this on a finished session
    /// is a no-op; the current state is returned either way.
    pub fn check_timeout(&mut self, now: DateTime<Utc>) -> SessionState {
        if self.state == SessionState::InProgress && self.remaining_time(now).is_zero() {
            self.state = SessionState::TimedOut;
            tracing::info!(
                "session timed out with {}/{} answered",
                self.answers.len(),
                self.set.len()
            );
        }
        self.state
    }

    /// End the session now. Unanswered questions stay unanswered.
    pub fn submit(&mut self) -> Result<(), QuizError> {
        self.ensure_in_progress()?;
        self.state = SessionState::Submitted;
        tracing::info!(
            "session submitted with {}/{} answered",
            self.answers.len(),
            self.set.len()
        );
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        // `current` is always within the non-empty set.
        &self.set.questions()[self.current]
    }

    /// Number of questions in the session.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Always false: empty sets are rejected at start.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.set
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn answer_for(&self, question_id: u32) -> Option<OptionLabel> {
        self.answers.get(question_id)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + self.duration
    }

    pub fn progress(&self) -> SessionProgress {
        let total = self.set.len();
        let answered = self
            .set
            .iter()
            .filter(|q| self.answers.get(q.id()).is_some())
            .count();
        SessionProgress {
            total,
            answered,
            unanswered: total - answered,
        }
    }
}

//! Core data model types for quizline.
//!
//! Questions, option labels, the supported quiz sizes and the immutable
//! question set a session runs over.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label of a multiple-choice option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLabel {
    /// All labels in display order.
    pub const ALL: [OptionLabel; 5] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
        OptionLabel::E,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
            OptionLabel::E => "E",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            "E" => Ok(OptionLabel::E),
            other => Err(format!("unknown option label: {other:?}")),
        }
    }
}

/// Errors from building a [`Question`] or [`QuestionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question {0} has no options")]
    NoOptions(u32),

    #[error("question {id}: correct answer {correct} is not one of its options")]
    CorrectNotAnOption { id: u32, correct: OptionLabel },

    #[error("duplicate question number {0}")]
    DuplicateId(u32),
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    id: u32,
    prompt: String,
    options: BTreeMap<OptionLabel, String>,
    correct: OptionLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clause: Option<String>,
}

impl Question {
    /// Build a question, checking that the correct label is one of the options.
    pub fn new(
        id: u32,
        prompt: impl Into<String>,
        options: BTreeMap<OptionLabel, String>,
        correct: OptionLabel,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions(id));
        }
        if !options.contains_key(&correct) {
            return Err(QuestionError::CorrectNotAnOption { id, correct });
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct,
            reference: None,
            clause: None,
        })
    }

    /// Attach the source document this question is drawn from.
    pub fn with_reference(mut self, reference: Option<String>, clause: Option<String>) -> Self {
        self.reference = reference;
        self.clause = clause;
        self
    }

    /// Sequence number from the question bank.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in label order.
    pub fn options(&self) -> &BTreeMap<OptionLabel, String> {
        &self.options
    }

    pub fn option_text(&self, label: OptionLabel) -> Option<&str> {
        self.options.get(&label).map(String::as_str)
    }

    pub fn has_option(&self, label: OptionLabel) -> bool {
        self.options.contains_key(&label)
    }

    pub fn correct(&self) -> OptionLabel {
        self.correct
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }
}

/// Supported quiz lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuizSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl QuizSize {
    pub const ALL: [QuizSize; 3] = [QuizSize::Ten, QuizSize::Twenty, QuizSize::Fifty];

    /// Number of questions requested.
    pub fn count(&self) -> usize {
        match self {
            QuizSize::Ten => 10,
            QuizSize::Twenty => 20,
            QuizSize::Fifty => 50,
        }
    }
}

impl fmt::Display for QuizSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

impl TryFrom<u32> for QuizSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(QuizSize::Ten),
            20 => Ok(QuizSize::Twenty),
            50 => Ok(QuizSize::Fifty),
            other => Err(format!(
                "unsupported quiz size: {other} (choose 10, 20 or 50)"
            )),
        }
    }
}

impl FromStr for QuizSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid quiz size: {s:?}"))?;
        QuizSize::try_from(n)
    }
}

/// The fixed, ordered questions assigned to one session.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionSet {
    questions: Vec<Question>,
    requested: usize,
}

impl QuestionSet {
    /// Build a set from questions in the given order. Question ids must be
    /// unique because answers are keyed by id.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, QuestionError> {
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id) {
                return Err(QuestionError::DuplicateId(q.id));
            }
        }
        let requested = questions.len();
        Ok(Self {
            questions,
            requested,
        })
    }

    pub(crate) fn sampled(questions: Vec<Question>, requested: usize) -> Self {
        Self {
            questions,
            requested,
        }
    }

    /// Effective size.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Size originally asked for, before clamping to the bank.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// True when the bank held fewer questions than requested.
    pub fn was_clamped(&self) -> bool {
        self.questions.len() < self.requested
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

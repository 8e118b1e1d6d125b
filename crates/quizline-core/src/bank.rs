//! Question bank loading and validation.
//!
//! Banks are read from TOML or CSV files. Rows without question text are
//! skipped; every other malformed row is rejected so the session engine only
//! ever sees well-formed questions.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{OptionLabel, Question, QuestionError, QuizSize};

/// Source of questions for new sessions.
pub trait QuestionRepository {
    /// All questions, in bank order.
    fn load_questions(&self) -> Result<Vec<Question>>;
}

/// An in-memory, already-parsed question bank.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub name: String,
    pub questions: Vec<Question>,
}

impl QuestionRepository for QuestionBank {
    fn load_questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }
}

/// A malformed row in a question bank file. Rows are numbered from 1.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: missing question number")]
    MissingNumber { row: usize },

    #[error("row {row}: invalid question number {value:?}")]
    InvalidNumber { row: usize, value: String },

    #[error("row {row}: unknown option label {label:?}")]
    UnknownLabel { row: usize, label: String },

    #[error("row {row}: missing correct answer")]
    MissingCorrect { row: usize },

    #[error("row {row}: {source}")]
    Question {
        row: usize,
        #[source]
        source: QuestionError,
    },

    #[error("question number {id} appears on rows {first} and {second}")]
    DuplicateNumber { id: u32, first: usize, second: usize },
}

/// One row as read from a file, before validation.
#[derive(Debug, Default)]
struct RawQuestion {
    number: Option<u32>,
    prompt: Option<String>,
    options: Vec<(String, String)>,
    correct: Option<String>,
    reference: Option<String>,
    clause: Option<String>,
}

/// Trim a cell and treat blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawQuestion {
    /// Validate into a `Question`, or `None` when the row has no question text.
    fn into_question(self, row: usize) -> std::result::Result<Option<Question>, BankError> {
        let Some(prompt) = non_blank(self.prompt) else {
            tracing::debug!("row {row}: no question text, skipping");
            return Ok(None);
        };
        let id = self.number.ok_or(BankError::MissingNumber { row })?;

        let mut options = BTreeMap::new();
        for (label, text) in self.options {
            let Some(text) = non_blank(Some(text)) else {
                continue;
            };
            let label: OptionLabel = label
                .parse()
                .map_err(|_| BankError::UnknownLabel { row, label })?;
            options.insert(label, text);
        }

        let correct = non_blank(self.correct).ok_or(BankError::MissingCorrect { row })?;
        let correct: OptionLabel = correct
            .parse()
            .map_err(|_| BankError::UnknownLabel {
                row,
                label: correct.clone(),
            })?;

        let question = Question::new(id, prompt, options, correct)
            .map_err(|source| BankError::Question { row, source })?
            .with_reference(non_blank(self.reference), non_blank(self.clause));
        Ok(Some(question))
    }
}

/// Validate raw rows and reject duplicate question numbers.
fn collect_questions(
    rows: impl IntoIterator<Item = (usize, RawQuestion)>,
) -> std::result::Result<Vec<Question>, BankError> {
    let mut questions = Vec::new();
    let mut first_row: HashMap<u32, usize> = HashMap::new();

    for (row, raw) in rows {
        let Some(question) = raw.into_question(row)? else {
            continue;
        };
        if let Some(&first) = first_row.get(&question.id()) {
            return Err(BankError::DuplicateNumber {
                id: question.id(),
                first,
                second: row,
            });
        }
        first_row.insert(question.id(), row);
        questions.push(question);
    }

    Ok(questions)
}

// ---------------------------------------------------------------------------
// TOML
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    bank: Option<TomlBankHeader>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    number: Option<u32>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    options: BTreeMap<String, String>,
    #[serde(default)]
    correct: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    clause: Option<String>,
}

/// Parse a TOML question bank. The name falls back to `default_name` when
/// the file has no `[bank]` header.
pub fn parse_bank_toml_str(content: &str, default_name: &str) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content).context("failed to parse TOML bank")?;

    let rows = parsed.questions.into_iter().enumerate().map(|(i, q)| {
        (
            i + 1,
            RawQuestion {
                number: q.number,
                prompt: q.prompt,
                options: q.options.into_iter().collect(),
                correct: q.correct,
                reference: q.reference,
                clause: q.clause,
            },
        )
    });
    let questions = collect_questions(rows)?;

    Ok(QuestionBank {
        name: parsed
            .bank
            .map(|b| b.name)
            .unwrap_or_else(|| default_name.to_string()),
        questions,
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Column positions resolved from the CSV header row.
#[derive(Debug, Default)]
struct CsvColumns {
    number: Option<usize>,
    question: Option<usize>,
    options: Vec<(OptionLabel, usize)>,
    correct: Option<usize>,
    reference: Option<usize>,
    clause: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> std::result::Result<Self, BankError> {
        let mut cols = CsvColumns::default();
        for (i, header) in headers.iter().enumerate() {
            match header.trim().to_lowercase().as_str() {
                "number" | "no" | "#" => cols.number = Some(i),
                "question" | "prompt" => cols.question = Some(i),
                "correct" | "answer" => cols.correct = Some(i),
                "reference" => cols.reference = Some(i),
                "clause" => cols.clause = Some(i),
                other => {
                    if let Ok(label) = other.parse::<OptionLabel>() {
                        cols.options.push((label, i));
                    }
                }
            }
        }

        if cols.number.is_none() {
            return Err(BankError::MissingColumn("number"));
        }
        if cols.question.is_none() {
            return Err(BankError::MissingColumn("question"));
        }
        if cols.correct.is_none() {
            return Err(BankError::MissingColumn("correct"));
        }
        if cols.options.is_empty() {
            return Err(BankError::MissingColumn("A"));
        }
        Ok(cols)
    }
}

/// Parse a question number cell. Spreadsheet exports sometimes write `3.0`.
fn parse_number(row: usize, cell: &str) -> std::result::Result<Option<u32>, BankError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = cell.parse::<u32>() {
        return Ok(Some(n));
    }
    match cell.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(Some(f as u32)),
        _ => Err(BankError::InvalidNumber {
            row,
            value: cell.to_string(),
        }),
    }
}

/// Parse a CSV question bank with a header row.
pub fn parse_bank_csv_str(content: &str, name: &str) -> Result<QuestionBank> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("failed to read CSV header")?.clone();
    let cols = CsvColumns::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.with_context(|| format!("failed to read CSV row {row}"))?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::to_string);

        let number = match cell(cols.number) {
            Some(c) => parse_number(row, &c)?,
            None => None,
        };
        let options = cols
            .options
            .iter()
            .filter_map(|&(label, idx)| record.get(idx).map(|t| (label.to_string(), t.to_string())))
            .collect();

        rows.push((
            row,
            RawQuestion {
                number,
                prompt: cell(cols.question),
                options,
                correct: cell(cols.correct),
                reference: cell(cols.reference),
                clause: cell(cols.clause),
            },
        ));
    }

    let questions = collect_questions(rows)?;
    Ok(QuestionBank {
        name: name.to_string(),
        questions,
    })
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Load a question bank from a `.toml` or `.csv` file.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "questions".to_string());

    let bank = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => parse_bank_toml_str(&content, &stem),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => parse_bank_csv_str(&content, &stem),
        _ => anyhow::bail!(
            "unsupported question bank format: {} (expected .toml or .csv)",
            path.display()
        ),
    }
    .with_context(|| format!("invalid question bank: {}", path.display()))?;

    tracing::debug!(
        "loaded {} questions from {}",
        bank.questions.len(),
        path.display()
    );
    Ok(bank)
}

/// Load every `.toml` and `.csv` bank in a directory, recursively.
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "csv")
        {
            match load_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A non-fatal issue found in a bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question number (if applicable).
    pub question_id: Option<u32>,
    pub message: String,
}

/// Check a loaded bank for issues that do not prevent a quiz from running.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank has no questions; no quiz can start".into(),
        });
        return warnings;
    }

    for size in QuizSize::ALL {
        if bank.questions.len() < size.count() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "only {} questions; a {}-question quiz will be shortened",
                    bank.questions.len(),
                    size
                ),
            });
        }
    }

    for q in &bank.questions {
        if q.options().len() < 2 {
            warnings.push(ValidationWarning {
                question_id: Some(q.id()),
                message: "question has a single option".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[bank]
name = "Safety Basics"

[[questions]]
number = 1
prompt = "Which extinguisher is used on electrical fires?"
correct = "b"
reference = "Fire Code 2024"
clause = "Art. 12"

[questions.options]
A = "Water"
B = "CO2"
C = "Foam"

[[questions]]
number = 2
prompt = "Minimum exit width?"
correct = "A"

[questions.options]
A = "0.9 m"
B = "0.5 m"
"#;

    const VALID_CSV: &str = "\
number,question,A,B,C,D,E,correct,reference,clause
1,First?,one,two,three,four,,A,Doc 1,Art. 1
2,Second?,yes,no,,,,b,,
3,,skipped,row,,,,A,,
4,Fourth?,w,x,y,z,v,E,,
";

    #[test]
    fn parse_valid_toml() {
        let bank = parse_bank_toml_str(VALID_TOML, "fallback").unwrap();
        assert_eq!(bank.name, "Safety Basics");
        assert_eq!(bank.questions.len(), 2);

        let q = &bank.questions[0];
        assert_eq!(q.id(), 1);
        assert_eq!(q.correct(), OptionLabel::B);
        assert_eq!(q.options().len(), 3);
        assert_eq!(q.reference(), Some("Fire Code 2024"));
        assert_eq!(q.clause(), Some("Art. 12"));
    }

    #[test]
    fn toml_without_header_uses_default_name() {
        let toml = r#"
[[questions]]
number = 7
prompt = "Only one?"
correct = "A"
options = { A = "yes", B = "no" }
"#;
        let bank = parse_bank_toml_str(toml, "my-bank").unwrap();
        assert_eq!(bank.name, "my-bank");
        assert_eq!(bank.questions[0].id(), 7);
    }

    #[test]
    fn toml_rejects_correct_label_not_in_options() {
        let toml = r#"
[[questions]]
number = 1
prompt = "Broken"
correct = "D"
options = { A = "x", B = "y" }
"#;
        let err = parse_bank_toml_str(toml, "b").unwrap_err();
        assert!(format!("{err:#}").contains("not one of its options"));
    }

    #[test]
    fn toml_rejects_unknown_label() {
        let toml = r#"
[[questions]]
number = 1
prompt = "Broken"
correct = "A"
options = { A = "x", F = "y" }
"#;
        let err = parse_bank_toml_str(toml, "b").unwrap_err();
        assert!(format!("{err:#}").contains("unknown option label"));
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_bank_toml_str("this is not [valid toml }{", "b");
        assert!(result.is_err());
    }

    #[test]
    fn parse_valid_csv() {
        let bank = parse_bank_csv_str(VALID_CSV, "csv-bank").unwrap();
        assert_eq!(bank.name, "csv-bank");
        // Row 3 has no question text and is skipped.
        assert_eq!(bank.questions.len(), 3);

        let first = &bank.questions[0];
        assert_eq!(first.options().len(), 4);
        assert!(!first.has_option(OptionLabel::E));
        assert_eq!(first.reference(), Some("Doc 1"));

        let second = &bank.questions[1];
        assert_eq!(second.correct(), OptionLabel::B);
        assert_eq!(second.options().len(), 2);
        assert_eq!(second.reference(), None);

        assert!(bank.questions[2].has_option(OptionLabel::E));
    }

    #[test]
    fn csv_without_e_column() {
        let csv = "No,Prompt,A,B,Answer\n1.0,Pick one,x,y, a \n";
        let bank = parse_bank_csv_str(csv, "short").unwrap();
        assert_eq!(bank.questions[0].id(), 1);
        assert_eq!(bank.questions[0].correct(), OptionLabel::A);
    }

    #[test]
    fn csv_rejects_missing_column() {
        let csv = "number,question,A,B\n1,Q,x,y\n";
        let err = parse_bank_csv_str(csv, "b").unwrap_err();
        assert!(err.to_string().contains("missing required column: correct"));
    }

    #[test]
    fn csv_rejects_answer_for_absent_option() {
        let csv = "number,question,A,B,C,correct\n1,Q,x,y,,C\n";
        let err = parse_bank_csv_str(csv, "b").unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn csv_rejects_duplicate_numbers() {
        let csv = "number,question,A,correct\n5,Q1,x,A\n5,Q2,y,A\n";
        let err = parse_bank_csv_str(csv, "b").unwrap_err();
        assert!(err
            .to_string()
            .contains("question number 5 appears on rows 1 and 2"));
    }

    #[test]
    fn csv_rejects_bad_number() {
        let csv = "number,question,A,correct\nfirst,Q1,x,A\n";
        let err = parse_bank_csv_str(csv, "b").unwrap_err();
        assert!(err.to_string().contains("invalid question number"));
    }

    #[test]
    fn load_from_files_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("b.csv"), VALID_CSV).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml {").unwrap();

        let bank = load_bank(&dir.path().join("b.csv")).unwrap();
        assert_eq!(bank.name, "b");

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name, "Safety Basics");
        assert_eq!(banks[1].name, "b");
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.xlsx");
        std::fs::write(&path, "binary").unwrap();
        let err = load_bank(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported question bank format"));
    }

    #[test]
    fn repository_returns_bank_order() {
        let bank = parse_bank_csv_str(VALID_CSV, "b").unwrap();
        let ids: Vec<u32> = bank.load_questions().unwrap().iter().map(|q| q.id()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn validate_small_bank() {
        let bank = parse_bank_toml_str(VALID_TOML, "b").unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.message.contains("will be shortened"))
                .count(),
            3
        );
    }

    #[test]
    fn validate_empty_bank() {
        let bank = QuestionBank {
            name: "empty".into(),
            questions: vec![],
        };
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("no questions"));
    }
}

//! Per-question report rows and the saved quiz report.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::OptionLabel;
use crate::scorer::QuizResult;
use crate::session::SessionState;

/// One line of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 1-based position in the quiz.
    pub number: usize,
    /// Sequence number in the question bank.
    pub question_id: u32,
    pub prompt: String,
    pub submitted: Option<OptionLabel>,
    pub correct: OptionLabel,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ReportRow {
    /// The submitted label, or `"none"` when unanswered.
    pub fn submitted_display(&self) -> String {
        self.submitted
            .map(|l| l.to_string())
            .unwrap_or_else(|| "none".to_string())
    }

    /// Source reference with its clause, if any.
    pub fn reference_display(&self) -> &str {
        self.reference.as_deref().unwrap_or("")
    }
}

/// Turn a result into report rows, in question-set order.
pub fn build_report(result: &QuizResult) -> Vec<ReportRow> {
    result
        .outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| ReportRow {
            number: i + 1,
            question_id: o.question.id(),
            prompt: o.question.prompt().to_string(),
            submitted: o.submitted,
            correct: o.correct,
            is_correct: o.is_correct,
            reference: match (o.question.reference(), o.question.clause()) {
                (Some(r), Some(c)) => Some(format!("{r}, {c}")),
                (Some(r), None) => Some(r.to_string()),
                (None, Some(c)) => Some(c.to_string()),
                (None, None) => None,
            },
        })
        .collect()
}

/// A finished quiz, as exported to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Name of the question bank the quiz was drawn from.
    pub bank: String,
    pub state: SessionState,
    pub correct_count: usize,
    pub total: usize,
    pub percentage: f64,
    pub rows: Vec<ReportRow>,
}

impl QuizReport {
    pub fn from_result(bank: impl Into<String>, result: &QuizResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: bank.into(),
            state: result.state,
            correct_count: result.correct_count,
            total: result.total,
            percentage: result.percentage,
            rows: build_report(result),
        }
    }

    /// e.g. `"Correct: 7/10 (70.0%)"`.
    pub fn summary_line(&self) -> String {
        format!(
            "Correct: {}/{} ({:.1}%)",
            self.correct_count, self.total, self.percentage
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

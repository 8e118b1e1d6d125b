//! Markdown report generator.

use std::path::Path;

use anyhow::Result;

use quizline_core::report::QuizReport;

/// Keep table cells on one line and stop `|` from splitting columns.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Format a quiz report as markdown.
pub fn to_markdown(report: &QuizReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Results: {}\n\n", cell(&report.bank)));
    md.push_str(&format!(
        "**{}** ({}, {})\n\n",
        report.summary_line(),
        report.state,
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    md.push_str("| # | Question | Your answer | Correct answer | Result | Reference |\n");
    md.push_str("|---|----------|-------------|----------------|--------|-----------|\n");
    for row in &report.rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.number,
            cell(&row.prompt),
            row.submitted_display(),
            row.correct,
            if row.is_correct { "correct" } else { "wrong" },
            cell(row.reference_display()),
        ));
    }

    md
}

/// Write a markdown report to a file.
pub fn write_markdown_report(report: &QuizReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_markdown(report))?;
    Ok(())
}

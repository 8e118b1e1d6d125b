//! The `quizline show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_core::report::QuizReport;
use quizline_report::markdown::to_markdown;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = QuizReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => print!("{}", to_markdown(&report)),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_report(&report),
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }

    Ok(())
}

/// Print the score and the per-question table.
pub fn print_report(report: &QuizReport) {
    println!("Results for {} ({})", report.bank, report.state);
    println!("{}", report.summary_line());

    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Question",
        "Your answer",
        "Correct answer",
        "Result",
    ]);

    for row in &report.rows {
        table.add_row(vec![
            Cell::new(row.number),
            Cell::new(&row.prompt),
            Cell::new(row.submitted_display()),
            Cell::new(row.correct),
            Cell::new(if row.is_correct { "OK" } else { "X" }),
        ]);
    }

    println!("\n{table}");
}

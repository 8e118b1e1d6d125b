//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use quizline_core::report::QuizReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a quiz report.
pub fn generate_html(report: &QuizReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>quizline results: {}</title>\n",
        html_escape(&report.bank)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Your results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} questions | {} | {}</p>\n",
        html_escape(&report.bank),
        report.total,
        report.state,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score
    let grade = if report.percentage >= 80.0 {
        "good"
    } else if report.percentage >= 50.0 {
        "fair"
    } else {
        "poor"
    };
    html.push_str("<section class=\"score\">\n");
    html.push_str(&format!(
        "<p class=\"{grade}\">Correct: <strong>{}/{}</strong></p>\n<p class=\"{grade}\">Score: <strong>{:.1}%</strong></p>\n",
        report.correct_count, report.total, report.percentage
    ));
    html.push_str(&format!(
        "<div class=\"bar\"><div class=\"fill {grade}\" style=\"width: {:.1}%\"></div></div>\n",
        report.percentage.clamp(0.0, 100.0)
    ));
    html.push_str("</section>\n");

    // Per-question rows
    html.push_str("<section class=\"details\">\n");
    html.push_str("<h2>Question details</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Result</th><th>Reference</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for row in &report.rows {
        let (class, mark) = if row.is_correct {
            ("pass", "&#10004;")
        } else {
            ("fail", "&#10008;")
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            row.number,
            html_escape(&row.prompt),
            row.submitted_display(),
            row.correct,
            mark,
            html_escape(row.reference_display()),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &QuizReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --accent: #6c3da8; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1 { color: var(--accent); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score p { font-size: 1.25rem; margin: 0.25rem 0; }
.bar { height: 12px; width: 100%; max-width: 480px; background: var(--border); border-radius: 6px; overflow: hidden; }
.fill { height: 100%; }
.fill.good { background: #22c55e; }
.fill.fair { background: #eab308; }
.fill.poor { background: #ef4444; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

//! quizline-report — Render finished quiz reports as HTML or Markdown.

pub mod html;
pub mod markdown;

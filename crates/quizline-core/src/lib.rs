//! quizline-core — Quiz session engine.
//!
//! This crate defines the question model, question-bank loading, and the
//! session lifecycle: sampling a question set, running a timed session,
//! scoring it and building a per-question report.

pub mod bank;
pub mod error;
pub mod model;
pub mod report;
pub mod sampler;
pub mod scorer;
pub mod session;

//! The `quizline run` command.
//!
//! Reads one command per line from stdin while a one-second tick checks the
//! session deadline, so a quiz left idle still ends on time. Stdin is read on
//! its own thread so a pending read never keeps the process alive after the
//! quiz is over.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use quizline_core::bank::load_bank;
use quizline_core::error::QuizError;
use quizline_core::model::{OptionLabel, QuizSize};
use quizline_core::report::QuizReport;
use quizline_core::sampler::create_set;
use quizline_core::scorer::score;
use quizline_core::session::{Session, SessionState};
use quizline_report::html::write_html_report;
use quizline_report::markdown::write_markdown_report;

use crate::commands::show::print_report;
use crate::config::load_config_from;

/// Flags for `quizline run`; unset values fall back to the config file.
pub struct RunArgs {
    pub bank: Option<PathBuf>,
    pub size: Option<String>,
    pub duration: Option<u64>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let bank_path = args.bank.or(config.bank.clone()).context(
        "no question bank given; pass --bank or set `bank` in quizline.toml",
    )?;
    let size = match &args.size {
        Some(s) => s.parse::<QuizSize>().map_err(|e| anyhow::anyhow!(e))?,
        None => config.quiz_size()?,
    };
    let minutes = args.duration.unwrap_or(config.duration_minutes);
    let output = args.output.unwrap_or(config.output_dir.clone());
    let formats: Vec<String> = match &args.format {
        Some(f) => f.split(',').map(|s| s.trim().to_string()).collect(),
        None => config.formats.clone(),
    };

    let bank = load_bank(&bank_path)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let set = create_set(&bank.questions, size, &mut rng);
    if set.was_clamped() {
        println!(
            "Bank '{}' has only {} questions; running a {}-question quiz.",
            bank.name,
            set.len(),
            set.len()
        );
    }

    let duration = i64::try_from(minutes)
        .ok()
        .and_then(chrono::Duration::try_minutes)
        .with_context(|| format!("duration too long: {minutes} minutes"))?;
    let mut session = Session::start(set, duration, Utc::now())
        .with_context(|| format!("cannot start a quiz from '{}'", bank.name))?;

    println!(
        "{} questions, {} minutes. Type 'h' for help.",
        session.len(),
        minutes
    );

    drive_session(&mut session, spawn_stdin_reader(), Utc::now).await?;

    let result = score(&session)?;
    let report = QuizReport::from_result(&bank.name, &result);
    println!();
    print_report(&report);

    save_report(&report, &output, &formats)?;
    Ok(())
}

/// Write the report in each requested format.
fn save_report(report: &QuizReport, output: &std::path::Path, formats: &[String]) -> Result<()> {
    let formats: Vec<&str> = if formats.iter().any(|f| f == "all") {
        vec!["json", "html", "md"]
    } else {
        formats.iter().map(String::as_str).collect()
    };
    if formats.iter().all(|f| *f == "none") {
        return Ok(());
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    for fmt in formats {
        match fmt {
            "json" => {
                let path = output.join(format!("quiz-{timestamp}.json"));
                report.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("quiz-{timestamp}.html"));
                write_html_report(report, &path)?;
                println!("HTML report: {}", path.display());
            }
            "md" | "markdown" => {
                let path = output.join(format!("quiz-{timestamp}.md"));
                write_markdown_report(report, &path)?;
                println!("Markdown report: {}", path.display());
            }
            "none" => {}
            other => {
                eprintln!("Unknown format: {other}");
            }
        }
    }

    Ok(())
}

/// A line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Answer(OptionLabel),
    Next,
    Previous,
    /// 1-based question number.
    GoTo(usize),
    List,
    Time,
    Submit,
    Help,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim().to_lowercase();
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Command::Show);
    };
    let arg = parts.next();

    let command = match (word, arg) {
        ("n" | "next", None) => Command::Next,
        ("p" | "prev" | "previous", None) => Command::Previous,
        ("l" | "list", None) => Command::List,
        ("t" | "time", None) => Command::Time,
        ("s" | "submit", None) => Command::Submit,
        ("h" | "help" | "?", None) => Command::Help,
        ("g" | "goto", Some(n)) => Command::GoTo(parse_number(n)?),
        (w, None) if w.chars().all(|c| c.is_ascii_digit()) => Command::GoTo(parse_number(w)?),
        (w, None) if w.len() == 1 => Command::Answer(w.parse()?),
        _ => return Err(format!("unknown command: {line:?} (type 'h' for help)")),
    };
    Ok(command)
}

fn parse_number(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("invalid question number: {s:?}")),
    }
}

type InputLines = mpsc::Receiver<std::io::Result<String>>;

/// Forward stdin lines over a channel from a plain OS thread. The thread is
/// never joined; it ends with the process or at end of input.
fn spawn_stdin_reader() -> InputLines {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Run the interactive loop until the session is submitted or times out.
/// End of input submits whatever has been answered.
async fn drive_session<C>(session: &mut Session, mut lines: InputLines, now: C) -> Result<()>
where
    C: Fn() -> DateTime<Utc>,
{
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    show_question(session, now());

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if session.check_timeout(now()) == SessionState::TimedOut {
                    println!("\nTime is up!");
                    return Ok(());
                }
            }
            line = lines.recv() => {
                let line = line.transpose().context("failed to read input")?;
                if session.check_timeout(now()) == SessionState::TimedOut {
                    println!("\nTime is up!");
                    return Ok(());
                }
                let Some(line) = line else {
                    println!("End of input, submitting.");
                    session.submit()?;
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(command) => {
                        if apply(session, command, now())? {
                            return Ok(());
                        }
                    }
                    Err(msg) => println!("  ! {msg}"),
                }
            }
        }
    }
}

/// Apply one command. Returns `true` once the session has been submitted.
fn apply(session: &mut Session, command: Command, now: DateTime<Utc>) -> Result<bool> {
    let outcome = match command {
        Command::Show => {
            show_question(session, now);
            Ok(())
        }
        Command::Answer(label) => session.answer_current(label).map(|()| {
            println!("  Answer {label} recorded.");
            // Move on unless this is the last question.
            if session.go_next().is_ok() {
                show_question(session, now);
            } else {
                println!("  Last question. Type 's' to submit.");
            }
        }),
        Command::Next => session.go_next().map(|()| show_question(session, now)),
        Command::Previous => session.go_previous().map(|()| show_question(session, now)),
        Command::GoTo(n) => session.go_to(n - 1).map(|()| show_question(session, now)),
        Command::List => {
            list_answers(session);
            Ok(())
        }
        Command::Time => {
            println!("  {} left", format_remaining(session.remaining_time(now)));
            Ok(())
        }
        Command::Submit => {
            session.submit()?;
            println!("Submitted.");
            return Ok(true);
        }
        Command::Help => {
            print_help();
            Ok(())
        }
    };

    match outcome {
        Ok(()) => Ok(false),
        Err(e) if e.is_input_error() => {
            println!("  ! {}", describe(&e));
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// User-facing wording for input errors, with 1-based question numbers.
fn describe(err: &QuizError) -> String {
    match err {
        QuizError::OutOfRange { index, len } => {
            format!("there is no question {} (1-{len})", index + 1)
        }
        other => other.to_string(),
    }
}

fn format_remaining(remaining: chrono::Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn show_question(session: &Session, now: DateTime<Utc>) {
    let q = session.current_question();
    let progress = session.progress();
    let selected = session.answer_for(q.id());

    println!();
    println!(
        "Question {}/{}  [answered {}/{}, {} left]",
        session.current_index() + 1,
        session.len(),
        progress.answered,
        progress.total,
        format_remaining(session.remaining_time(now))
    );
    println!("{}", q.prompt());
    for (label, text) in q.options() {
        let marker = if selected == Some(*label) { "*" } else { " " };
        println!(" {marker} {label}. {text}");
    }
}

fn list_answers(session: &Session) {
    for (i, q) in session.question_set().iter().enumerate() {
        let answer = session
            .answer_for(q.id())
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        let here = if i == session.current_index() { ">" } else { " " };
        println!(" {here}{:>3}: {answer}", i + 1);
    }
}

fn print_help() {
    println!("  a-e        answer the current question");
    println!("  n / p      next / previous question");
    println!("  g N        go to question N");
    println!("  l          list your answers");
    println!("  t          time left");
    println!("  s          submit");
    println!("  (empty)    show the current question again");
}

//! Configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizline_core::model::QuizSize;

/// Top-level quizline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizlineConfig {
    /// Question bank used when `--bank` is not given.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// Quiz length when `--size` is not given (10, 20 or 50).
    #[serde(default = "default_size")]
    pub default_size: u32,
    /// Time allowed per quiz.
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u64,
    /// Output directory for saved reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report formats saved after each quiz.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_size() -> u32 {
    10
}
fn default_duration_minutes() -> u64 {
    60
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizline-results")
}
fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl Default for QuizlineConfig {
    fn default() -> Self {
        Self {
            bank: None,
            default_size: default_size(),
            duration_minutes: default_duration_minutes(),
            output_dir: default_output_dir(),
            formats: default_formats(),
        }
    }
}

impl QuizlineConfig {
    pub fn quiz_size(&self) -> Result<QuizSize> {
        QuizSize::try_from(self.default_size)
            .map_err(|e| anyhow::anyhow!("invalid default_size in config: {e}"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizline.toml` in the current directory
/// 2. `~/.config/quizline/config.toml`
///
/// Environment variable overrides: `QUIZLINE_BANK`, `QUIZLINE_DURATION_MINUTES`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizlineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizline.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizlineConfig::default(),
    };
    tracing::debug!("config loaded from {:?}", config_path);

    // Apply env var overrides
    if let Ok(bank) = std::env::var("QUIZLINE_BANK") {
        config.bank = Some(PathBuf::from(bank));
    }
    if let Ok(minutes) = std::env::var("QUIZLINE_DURATION_MINUTES") {
        config.duration_minutes = minutes
            .trim()
            .parse()
            .with_context(|| format!("invalid QUIZLINE_DURATION_MINUTES: {minutes:?}"))?;
    }

    Ok(config)
}

/// Parse config text and resolve `${VAR}` references in the bank path.
fn parse_config(content: &str) -> Result<QuizlineConfig> {
    let mut config: QuizlineConfig = toml::from_str(content)?;
    config.bank = config
        .bank
        .map(|b| PathBuf::from(resolve_env_vars(&b.to_string_lossy())));
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizline"))
}

//! Rendering of analysis outcomes.

pub mod terminal;

use crate::cli::OutputFormat;
use crate::core::{ErrorResult, Outcome};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Failures render as `{"error": {"kind": ..., "message": ...}}`.
#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a ErrorResult,
}

pub fn render(outcome: &Outcome, format: OutputFormat) -> Result<String> {
    let rendered = match (format, outcome) {
        (OutputFormat::Json, Ok(result)) => serde_json::to_string_pretty(result)?,
        (OutputFormat::Json, Err(error)) => serde_json::to_string_pretty(&ErrorEnvelope { error })?,
        (OutputFormat::Yaml, Ok(result)) => serde_yaml::to_string(result)?,
        (OutputFormat::Yaml, Err(error)) => serde_yaml::to_string(&ErrorEnvelope { error })?,
        (OutputFormat::Terminal, outcome) => terminal::render(outcome),
    };
    Ok(rendered)
}

/// Write to `path`, or stdout when it is `None`.
pub fn emit(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content.trim_end())?;
        }
    }
    Ok(())
}

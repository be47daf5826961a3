use crate::cli::OutputFormat;
use crate::config::{self, AnalyzerConfig};
use crate::core::{Language, Outcome};
use crate::engine::Analyzer;
use crate::exit_codes;
use crate::output;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Arguments of `algoscope analyze`, after clap parsing.
pub struct AnalyzeConfig {
    pub language: Language,
    /// Source file, or `-` for stdin.
    pub file: PathBuf,
    pub format: OutputFormat,
    /// Write the report here instead of stdout.
    pub output: Option<PathBuf>,
    /// Explicit config file. Without it `.algoscope.toml` is discovered
    /// from the working directory upward.
    pub config: Option<PathBuf>,
}

/// Run the command and return the process exit code.
pub fn analyze_file(cmd: AnalyzeConfig) -> Result<i32> {
    let config = resolve_config(cmd.config.as_deref())?;
    let source = read_source(&cmd.file)?;

    let outcome = run(&source, cmd.language, config);
    let rendered = output::render(&outcome, cmd.format)?;
    output::emit(&rendered, cmd.output.as_deref())?;

    Ok(exit_codes::for_outcome(&outcome))
}

/// Analyze `source` with a fresh analyzer.
///
/// Failures come back inside the [`Outcome`]; rendering and the exit code
/// are left to the caller.
pub fn run(source: &str, language: Language, config: AnalyzerConfig) -> Outcome {
    let analyzer = Analyzer::new(config);
    let outcome = analyzer.analyze(source, language);
    match &outcome {
        Ok(result) => log::debug!(
            "analyzed {} bytes of {}: time {}, score {}",
            source.len(),
            language,
            result.time_complexity,
            result.performance.score
        ),
        Err(error) => log::debug!("analysis of {} input failed: {}", language, error.kind),
    }
    outcome
}

fn resolve_config(explicit: Option<&Path>) -> Result<AnalyzerConfig> {
    match explicit {
        Some(path) => config::load_explicit(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(config::load_config()),
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading source from stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

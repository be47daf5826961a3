use crate::core::Language;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "algoscope")]
#[command(about = "Static time/space complexity and pattern estimator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate complexity, patterns, advice and score for one source file
    Analyze {
        /// Source language
        #[arg(short, long = "lang", value_enum)]
        lang: Language,

        /// Source file to analyze (`-` reads stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(short = 'F', long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (skips .algoscope.toml discovery)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default .algoscope.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Terminal,
}

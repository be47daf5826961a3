// Export modules for library usage
pub mod adapter;
pub mod advice;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod exit_codes;
pub mod features;
pub mod observability;
pub mod output;
pub mod patterns;
pub mod scoring;

// Re-export commonly used types
pub use crate::core::{
    AnalysisResult, ComplexityClass, ComplexityEstimate, ErrorKind, ErrorResult, Language,
    Outcome, PatternMatch, PerformanceReport, SourceUnit,
};

pub use crate::adapter::{tokenize, Token, TokenStream};
pub use crate::advice::{advise, Advice, Inefficiency};
pub use crate::complexity::{infer, Inference};
pub use crate::config::AnalyzerConfig;
pub use crate::engine::{Analyzer, Delivery, Ticket};
pub use crate::errors::AnalysisError;
pub use crate::features::{extract, SyntaxFeatureSet};
pub use crate::patterns::{recognize, Detector};
pub use crate::scoring::score;

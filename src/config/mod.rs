//! Analyzer configuration.
//!
//! Every field has a default, so an empty `.algoscope.toml` (or none at all)
//! yields [`AnalyzerConfig::default`]. Files are discovered by [`loader`].

mod loader;

pub use loader::{
    directory_ancestors, load_config, load_config_from, load_explicit, CONFIG_FILE_NAME,
    MAX_TRAVERSAL_DEPTH,
};

use crate::advice::Inefficiency;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling on suggestion and optimization list lengths.
pub const MAX_LIST_LEN: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub scoring: ScoringConfig,
    pub patterns: PatternConfig,
    pub limits: LimitsConfig,
    pub engine: EngineConfig,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.patterns.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Penalty subtracted from the baseline score of 100 per matched
/// inefficiency. Keys are the inefficiency rule ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScoringConfig {
    pub exponential_recursion: u32,
    pub deep_nesting: u32,
    pub nested_loop: u32,
    pub linear_membership: u32,
    pub sort_in_loop: u32,
    pub call_stack_growth: u32,
    pub quadratic_space: u32,
    pub excessive_branching: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exponential_recursion: 35,
            deep_nesting: 15,
            nested_loop: 20,
            linear_membership: 10,
            sort_in_loop: 15,
            call_stack_growth: 5,
            quadratic_space: 5,
            excessive_branching: 5,
        }
    }
}

impl ScoringConfig {
    pub fn penalty(&self, rule: Inefficiency) -> u32 {
        match rule {
            Inefficiency::ExponentialRecursion => self.exponential_recursion,
            Inefficiency::DeepNesting => self.deep_nesting,
            Inefficiency::NestedLoop => self.nested_loop,
            Inefficiency::LinearMembership => self.linear_membership,
            Inefficiency::SortInLoop => self.sort_in_loop,
            Inefficiency::CallStackGrowth => self.call_stack_growth,
            Inefficiency::QuadraticSpace => self.quadratic_space,
            Inefficiency::ExcessiveBranching => self.excessive_branching,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match Inefficiency::ALL
            .iter()
            .find(|rule| self.penalty(**rule) > 100)
        {
            Some(rule) => Err(ConfigError::Invalid(format!(
                "scoring.{} must be between 0 and 100, got {}",
                rule.id(),
                self.penalty(*rule)
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Matches below this confidence are dropped.
    pub confidence_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

impl PatternConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "patterns.confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_suggestions: usize,
    pub max_optimizations: usize,
    /// Branch count above which `excessive-branching` fires.
    pub branch_threshold: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_suggestions: MAX_LIST_LEN,
            max_optimizations: MAX_LIST_LEN,
            branch_threshold: 10,
        }
    }
}

impl LimitsConfig {
    /// Configured suggestion count, never above [`MAX_LIST_LEN`].
    pub fn suggestion_limit(&self) -> usize {
        self.max_suggestions.min(MAX_LIST_LEN)
    }

    /// Configured optimization count, never above [`MAX_LIST_LEN`].
    pub fn optimization_limit(&self) -> usize {
        self.max_optimizations.min(MAX_LIST_LEN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cached results kept before the oldest is evicted.
    pub cache_capacity: usize,
    /// Inputs larger than this run on a blocking worker in async submission.
    pub offload_threshold_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 256,
            offload_threshold_bytes: 64 * 1024,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Written by `algoscope init`. Must parse back to the defaults.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# algoscope configuration

[scoring]
# Points subtracted from 100 for each matched inefficiency.
exponential-recursion = 35
deep-nesting = 15
nested-loop = 20
linear-membership = 10
sort-in-loop = 15
call-stack-growth = 5
quadratic-space = 5
excessive-branching = 5

[patterns]
# Pattern matches below this confidence are not reported.
confidence_threshold = 0.5

[limits]
# At most 5 entries are ever reported per list.
max_suggestions = 5
max_optimizations = 5
branch_threshold = 10

[engine]
cache_capacity = 256
offload_threshold_bytes = 65536
"#;

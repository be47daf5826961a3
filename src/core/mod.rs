//! Shared data model for the analysis pipeline.
//!
//! Types here cross stage boundaries: the immutable [`SourceUnit`] input, the
//! [`ComplexityClass`] vocabulary, and the serialized [`AnalysisResult`] /
//! [`ErrorResult`] union handed to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported source languages. The set is closed: any other tag is rejected
/// at the boundary.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    #[value(name = "javascript")]
    JavaScript,
    #[value(name = "typescript")]
    TypeScript,
    Java,
    Cpp,
    Rust,
    Go,
    Swift,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Cpp,
        Language::Rust,
        Language::Go,
        Language::Swift,
    ];

    /// Lowercase tag used on the wire and in fingerprints.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Swift => "swift",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Swift => "Swift",
        }
    }

    /// Python is the only supported language whose blocks are delimited by
    /// indentation rather than braces.
    pub fn is_indentation_significant(self) -> bool {
        matches!(self, Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language tag `{0}` (expected one of python, javascript, typescript, java, cpp, rust, go, swift)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts exactly the lowercase tags returned by [`Language::tag`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.tag() == s)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Immutable analysis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub text: String,
    pub language: Language,
}

impl SourceUnit {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Asymptotic growth classes, ordered from cheapest to most expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexityClass {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
}

impl ComplexityClass {
    /// Polynomial class for `n^degree`, capped at cubic.
    pub fn polynomial(degree: usize) -> Self {
        match degree {
            0 => ComplexityClass::Constant,
            1 => ComplexityClass::Linear,
            2 => ComplexityClass::Quadratic,
            _ => ComplexityClass::Cubic,
        }
    }

    /// Position on the growth ladder; the difference between two ranks is the
    /// size of an improvement.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn notation(self) -> &'static str {
        match self {
            ComplexityClass::Constant => "O(1)",
            ComplexityClass::Logarithmic => "O(log n)",
            ComplexityClass::Linear => "O(n)",
            ComplexityClass::Linearithmic => "O(n log n)",
            ComplexityClass::Quadratic => "O(n^2)",
            ComplexityClass::Cubic => "O(n^3)",
            ComplexityClass::Exponential => "O(2^n)",
        }
    }

    /// One polynomial degree higher, saturating at cubic. Exponential stays put.
    pub fn bump(self) -> Self {
        match self {
            ComplexityClass::Constant => ComplexityClass::Linear,
            ComplexityClass::Logarithmic => ComplexityClass::Linearithmic,
            ComplexityClass::Linear | ComplexityClass::Linearithmic => ComplexityClass::Quadratic,
            ComplexityClass::Quadratic | ComplexityClass::Cubic => ComplexityClass::Cubic,
            ComplexityClass::Exponential => ComplexityClass::Exponential,
        }
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// A complexity class plus the ordered ids of the rules that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityEstimate {
    pub class: ComplexityClass,
    pub derivation: Vec<&'static str>,
}

impl ComplexityEstimate {
    pub fn new(class: ComplexityClass, derivation: Vec<&'static str>) -> Self {
        Self { class, derivation }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub name: &'static str,
    /// Always within `[0, 1]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub score: u8,
    pub details: Vec<String>,
}

/// Successful analysis, rendered verbatim by the feedback panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub time_complexity: String,
    pub space_complexity: String,
    pub suggestions: Vec<String>,
    pub optimizations: Vec<String>,
    pub patterns: Vec<String>,
    pub performance: PerformanceReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EmptyInput,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::EmptyInput => f.write_str("EmptyInput"),
            ErrorKind::InternalError => f.write_str("InternalError"),
        }
    }
}

/// Failed analysis, the other half of [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub kind: ErrorKind,
    pub message: String,
}

/// Every engine call yields exactly one of a result or an error.
pub type Outcome = Result<AnalysisResult, ErrorResult>;

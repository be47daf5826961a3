//! Error taxonomy for the analysis pipeline.
//!
//! [`AnalysisError`] is what stages return internally. At the engine
//! boundary it is converted into the serializable [`ErrorResult`], so callers
//! only ever see the two kinds named in [`ErrorKind`].

use crate::core::{ErrorKind, ErrorResult};
use crate::observability::AnalysisPhase;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Blank or whitespace-only source text.
    #[error("source text is empty")]
    EmptyInput,
    /// Unexpected failure in one of the pipeline stages.
    #[error("internal failure{}: {message}", during(.phase))]
    Internal {
        phase: Option<AnalysisPhase>,
        message: String,
    },
}

fn during(phase: &Option<AnalysisPhase>) -> String {
    phase.map(|p| format!(" during {p}")).unwrap_or_default()
}

impl AnalysisError {
    pub fn internal(phase: Option<AnalysisPhase>, message: impl Into<String>) -> Self {
        Self::Internal {
            phase,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::Internal { .. } => ErrorKind::InternalError,
        }
    }
}

impl From<AnalysisError> for ErrorResult {
    fn from(error: AnalysisError) -> Self {
        let message = match &error {
            AnalysisError::EmptyInput => {
                "Nothing to analyze yet: the source text is empty.".to_string()
            }
            AnalysisError::Internal { phase, .. } => format!(
                "Analysis failed unexpectedly{}. Please try again.",
                during(phase)
            ),
        };
        ErrorResult {
            kind: error.kind(),
            message,
        }
    }
}

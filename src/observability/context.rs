//! Thread-local context tracking for crash reports.
//!
//! Records which pipeline stage is running and for which language, so that a
//! panic hook or the engine's failure handler can say where things went wrong.
//! Guards restore the previous context on drop.

use crate::core::Language;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Analyses started in this process, across all threads.
static ANALYSES_STARTED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<AnalysisContext> = const { RefCell::new(AnalysisContext::new()) };
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub phase: Option<AnalysisPhase>,
    pub language: Option<Language>,
    /// Generation of the request being processed, when it came through the
    /// engine's ticketed path.
    pub generation: Option<u64>,
}

impl AnalysisContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            language: None,
            generation: None,
        }
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisPhase {
    Tokenizing,
    FeatureExtraction,
    ComplexityInference,
    PatternRecognition,
    Advice,
    Scoring,
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tokenizing => write!(f, "tokenizing"),
            Self::FeatureExtraction => write!(f, "feature_extraction"),
            Self::ComplexityInference => write!(f, "complexity_inference"),
            Self::PatternRecognition => write!(f, "pattern_recognition"),
            Self::Advice => write!(f, "advice"),
            Self::Scoring => write!(f, "scoring"),
        }
    }
}

/// RAII guard for restoring analysis context on drop.
pub struct ContextGuard {
    previous: AnalysisContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

fn update(apply: impl FnOnce(&mut AnalysisContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        apply(&mut ctx.borrow_mut());
        ContextGuard { previous }
    })
}

/// Set the current pipeline phase until the guard drops.
#[must_use]
pub fn set_phase(phase: AnalysisPhase) -> ContextGuard {
    update(|ctx| ctx.phase = Some(phase))
}

/// Mark the start of one analysis for `language`.
#[must_use]
pub fn begin_analysis(language: Language, generation: Option<u64>) -> ContextGuard {
    ANALYSES_STARTED.fetch_add(1, Ordering::Relaxed);
    update(|ctx| {
        ctx.language = Some(language);
        ctx.generation = generation;
        ctx.phase = None;
    })
}

#[must_use]
pub fn get_current_context() -> AnalysisContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

#[must_use]
pub fn analyses_started() -> usize {
    ANALYSES_STARTED.load(Ordering::Relaxed)
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = AnalysisContext::new();
    });
}

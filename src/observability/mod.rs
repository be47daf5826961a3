//! Observability infrastructure for crash reports and debugging.
//!
//! - **Context tracking**: thread-local pipeline phase and language, restored
//!   by RAII guards.
//! - **Panic hook**: logs a structured crash report naming the failed phase.
//! - **Tracing**: stderr subscriber for the binary, filtered by `RUST_LOG`.
//!
//! ```ignore
//! use algoscope::observability::{set_phase, AnalysisPhase};
//!
//! let _phase = set_phase(AnalysisPhase::Tokenizing);
//! // a panic here is reported as a tokenizing failure
//! ```

pub mod context;
pub mod panic_hook;
pub mod tracing;

pub use context::{
    analyses_started, begin_analysis, get_current_context, reset_context, set_phase,
    AnalysisContext, AnalysisPhase, ContextGuard,
};
pub(crate) use panic_hook::payload_message;
pub use panic_hook::install_panic_hook;
pub use self::tracing::init_tracing;

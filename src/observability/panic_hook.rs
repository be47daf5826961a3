//! Panic hook producing a short structured crash report.
//!
//! The engine converts pipeline panics into `InternalError` results and logs
//! that error itself. Inside an analysis the hook only records where the
//! panic happened, at debug level; outside one it logs the full report.

use super::context::{analyses_started, get_current_context, AnalysisContext};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Replace the default panic hook. Call once, early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        report_panic(info);
    }));
}

fn report_panic(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let message = extract_panic_message(info);
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "unknown".to_string());

    if recovered_by_engine(&context) {
        tracing::debug!(
            location = %location,
            context = %describe(&context),
            "pipeline panic, reported as internal error"
        );
        return;
    }

    tracing::error!(
        version = VERSION,
        timestamp = %chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        location = %location,
        context = %describe(&context),
        analyses = analyses_started(),
        "panic: {}",
        truncate(&message, 200)
    );
    if std::env::var("RUST_BACKTRACE").is_ok() {
        tracing::error!("{}", std::backtrace::Backtrace::capture());
    }
}

/// An analysis is open on this thread, so `catch_unwind` in the engine
/// will turn the panic into an error result.
fn recovered_by_engine(context: &AnalysisContext) -> bool {
    context.language.is_some()
}

fn describe(context: &AnalysisContext) -> String {
    let phase = context
        .phase
        .map(|p| p.to_string())
        .unwrap_or_else(|| "(not set)".to_string());
    let language = context
        .language
        .map(|l| l.tag())
        .unwrap_or("(not set)");
    match context.generation {
        Some(generation) => format!("phase={phase} language={language} generation={generation}"),
        None => format!("phase={phase} language={language}"),
    }
}

pub(crate) fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    payload_message(info.payload())
}

/// Text of a panic payload, as produced by `panic!` with a literal or a
/// formatted message.
pub(crate) fn payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

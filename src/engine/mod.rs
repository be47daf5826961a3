//! Public entry point: runs the pipeline, caches results, maps failures to
//! [`ErrorResult`] and suppresses stale deliveries.
//!
//! Two ways in:
//!
//! - [`Analyzer::analyze`] is a plain cache-aware call.
//! - [`Analyzer::begin`] / [`Analyzer::complete`] (or the async
//!   [`Analyzer::submit`]) tag each request with a generation number. When a
//!   newer request has begun by the time an older one completes, the older
//!   result is reported as [`Delivery::Superseded`] and never cached.

mod cache;

pub use cache::{CacheStats, Fingerprint, ResultCache};

use crate::adapter::tokenize;
use crate::advice::advise;
use crate::complexity::infer;
use crate::config::AnalyzerConfig;
use crate::core::{AnalysisResult, ErrorResult, Language, Outcome, SourceUnit};
use crate::errors::AnalysisError;
use crate::features::extract;
use crate::observability::{self, payload_message, AnalysisPhase};
use crate::patterns::recognize;
use crate::scoring::score;
use parking_lot::Mutex;
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A claimed generation plus the input it belongs to.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    unit: SourceUnit,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }
}

/// What a ticketed request yields when it completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// This request is still the latest; its outcome is cached on success.
    Delivered(Outcome),
    /// A newer request began before this one completed.
    Superseded { generation: u64, latest: u64 },
}

impl Delivery {
    /// The outcome, or `None` when superseded.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Delivery::Delivered(outcome) => Some(outcome),
            Delivery::Superseded { .. } => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Delivery::Superseded { .. })
    }
}

pub struct Analyzer {
    config: AnalyzerConfig,
    cache: Mutex<ResultCache>,
    latest: AtomicU64,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let cache = ResultCache::new(config.engine.cache_capacity);
        Self {
            config,
            cache: Mutex::new(cache),
            latest: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze `text` outside the generation protocol.
    pub fn analyze(&self, text: &str, language: Language) -> Outcome {
        let unit = SourceUnit::new(text, language);
        let key = Fingerprint::of(&unit.text, language);
        if let Some(hit) = self.lookup(key, language) {
            return Ok(hit);
        }
        let result = self.compute(&unit, None);
        if let Ok(fresh) = &result {
            self.cache.lock().insert(key, fresh.clone());
        }
        result.map_err(ErrorResult::from)
    }

    /// Claim the next generation. Every earlier ticket becomes stale.
    pub fn begin(&self, text: impl Into<String>, language: Language) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, language = %language, "analysis requested");
        Ticket {
            generation,
            unit: SourceUnit::new(text, language),
        }
    }

    /// Run the ticket's analysis and deliver it unless a newer ticket exists.
    pub fn complete(&self, ticket: Ticket) -> Delivery {
        let language = ticket.unit.language;
        let key = Fingerprint::of(&ticket.unit.text, language);

        let (outcome, fresh) = match self.lookup(key, language) {
            Some(hit) => (Ok(hit), false),
            None => (self.compute(&ticket.unit, Some(ticket.generation)), true),
        };

        // Generation check and cache commit happen under one lock.
        let mut cache = self.cache.lock();
        if let Some(stale) = self.stale(ticket.generation) {
            return stale;
        }
        if let (true, Ok(result)) = (fresh, &outcome) {
            cache.prepare_for(language);
            cache.insert(key, result.clone());
        }
        Delivery::Delivered(outcome.map_err(ErrorResult::from))
    }

    /// Async form of [`begin`](Self::begin) + [`complete`](Self::complete).
    /// Inputs above the configured size run on a blocking worker.
    pub async fn submit(self: &Arc<Self>, text: impl Into<String>, language: Language) -> Delivery {
        let ticket = self.begin(text, language);
        if ticket.unit.text.len() <= self.config.engine.offload_threshold_bytes {
            return self.complete(ticket);
        }

        let generation = ticket.generation;
        let this = Arc::clone(self);
        match tokio::task::spawn_blocking(move || this.complete(ticket)).await {
            Ok(delivery) => delivery,
            Err(join_error) => {
                if let Some(stale) = self.stale(generation) {
                    return stale;
                }
                tracing::error!(generation, error = %join_error, "analysis worker failed");
                Delivery::Delivered(Err(AnalysisError::internal(None, join_error.to_string()).into()))
            }
        }
    }

    /// Empty the result cache.
    pub fn reset(&self) {
        self.cache.lock().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    fn stale(&self, generation: u64) -> Option<Delivery> {
        let latest = self.latest.load(Ordering::SeqCst);
        if generation == latest {
            return None;
        }
        tracing::debug!(generation, latest, "discarding superseded analysis");
        Some(Delivery::Superseded { generation, latest })
    }

    fn lookup(&self, key: Fingerprint, language: Language) -> Option<AnalysisResult> {
        let mut cache = self.cache.lock();
        cache.prepare_for(language);
        cache.get(key)
    }

    fn compute(
        &self,
        unit: &SourceUnit,
        generation: Option<u64>,
    ) -> Result<AnalysisResult, AnalysisError> {
        guarded(unit, generation, |reached| {
            run_pipeline(unit, &self.config, reached)
        })
    }
}

/// Run `pipeline` with phase tracking, converting a panic into an
/// `Internal` error naming the last phase entered.
fn guarded<F>(
    unit: &SourceUnit,
    generation: Option<u64>,
    pipeline: F,
) -> Result<AnalysisResult, AnalysisError>
where
    F: FnOnce(&Cell<Option<AnalysisPhase>>) -> Result<AnalysisResult, AnalysisError>,
{
    let _analysis = observability::begin_analysis(unit.language, generation);
    let reached = Cell::new(None);

    let result = catch_unwind(AssertUnwindSafe(|| pipeline(&reached))).unwrap_or_else(|payload| {
        Err(AnalysisError::internal(
            reached.get(),
            payload_message(payload.as_ref()),
        ))
    });

    if let Err(error @ AnalysisError::Internal { .. }) = &result {
        tracing::error!(language = %unit.language, "{error}");
    }
    result
}

fn run_pipeline(
    unit: &SourceUnit,
    config: &AnalyzerConfig,
    reached: &Cell<Option<AnalysisPhase>>,
) -> Result<AnalysisResult, AnalysisError> {
    let enter = |phase| {
        reached.set(Some(phase));
        observability::set_phase(phase)
    };

    let tokens = {
        let _phase = enter(AnalysisPhase::Tokenizing);
        tokenize(&unit.text, unit.language)?
    };
    let features = {
        let _phase = enter(AnalysisPhase::FeatureExtraction);
        extract(&tokens)
    };
    let inference = {
        let _phase = enter(AnalysisPhase::ComplexityInference);
        infer(&features)
    };
    let patterns = {
        let _phase = enter(AnalysisPhase::PatternRecognition);
        recognize(&features, &tokens, config.patterns.confidence_threshold)
    };
    drop(tokens);
    let advice = {
        let _phase = enter(AnalysisPhase::Advice);
        advise(&features, &inference, &patterns, &config.limits)
    };
    let performance = {
        let _phase = enter(AnalysisPhase::Scoring);
        score(&inference, &advice.matched, &config.scoring)
    };

    Ok(AnalysisResult {
        time_complexity: inference.time.class.notation().to_string(),
        space_complexity: inference.space.class.notation().to_string(),
        suggestions: advice.suggestions,
        optimizations: advice.optimizations,
        patterns: patterns.iter().map(|m| m.name.to_string()).collect(),
        performance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    const LOOP: &str = "def f(a):\n    for x in a:\n        print(x)\n";

    #[test]
    fn test_empty_input_is_an_error_and_not_cached() {
        let analyzer = Analyzer::default();
        let err = analyzer.analyze("  \n", Language::Python).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyInput);
        assert_eq!(analyzer.cache_len(), 0);
    }

    #[test]
    fn test_second_call_hits_cache() {
        let analyzer = Analyzer::default();
        let first = analyzer.analyze(LOOP, Language::Python);
        let second = analyzer.analyze(LOOP, Language::Python);
        assert_eq!(first, second);
        assert_eq!(analyzer.cache_len(), 1);
        assert_eq!(analyzer.cache_stats().hits, 1);
    }

    #[test]
    fn test_language_change_and_reset_clear_cache() {
        let analyzer = Analyzer::default();
        analyzer.analyze(LOOP, Language::Python).unwrap();
        analyzer
            .analyze("for (const x of a) { f(x); }", Language::JavaScript)
            .unwrap();
        assert_eq!(analyzer.cache_len(), 1);
        analyzer.reset();
        assert_eq!(analyzer.cache_len(), 0);
    }

    #[test]
    fn test_stale_ticket_is_superseded_and_not_cached() {
        let analyzer = Analyzer::default();
        let old = analyzer.begin(LOOP, Language::Python);
        let new = analyzer.begin("x = 1\n", Language::Python);

        assert_eq!(
            analyzer.complete(old),
            Delivery::Superseded {
                generation: 1,
                latest: 2
            }
        );
        assert_eq!(analyzer.cache_len(), 0);

        let delivered = analyzer.complete(new).outcome().unwrap().unwrap();
        assert_eq!(delivered.time_complexity, "O(1)");
        assert_eq!(analyzer.cache_len(), 1);
    }

    #[test]
    fn test_pipeline_panic_becomes_internal_error() {
        let unit = SourceUnit::new("x = 1", Language::Python);
        let result = guarded(&unit, None, |reached| {
            reached.set(Some(AnalysisPhase::Scoring));
            panic!("boom")
        });
        assert_eq!(
            result,
            Err(AnalysisError::internal(Some(AnalysisPhase::Scoring), "boom"))
        );
        let error: ErrorResult = result.unwrap_err().into();
        assert_eq!(error.kind, ErrorKind::InternalError);
        assert!(error.message.contains("scoring"));
    }
}

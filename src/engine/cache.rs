//! In-memory result cache keyed by content fingerprint.

use crate::core::{AnalysisResult, Language};
use std::collections::{HashMap, VecDeque};
use xxhash_rust::xxh64::xxh64;

/// Stable hash of `(language, text)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of(text: &str, language: Language) -> Self {
        let mut bytes = Vec::with_capacity(text.len() + 16);
        bytes.extend_from_slice(language.tag().as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(text.as_bytes());
        Self(xxh64(&bytes, 0))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded cache of successful results. All entries share one language;
/// a request for another language empties it.
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    language: Option<Language>,
    entries: HashMap<Fingerprint, AnalysisResult>,
    order: VecDeque<Fingerprint>,
    stats: CacheStats,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            language: None,
            entries: HashMap::new(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Drop everything if the cached entries belong to another language.
    pub fn prepare_for(&mut self, language: Language) {
        if self.language.is_some_and(|cached| cached != language) {
            tracing::debug!(
                from = ?self.language,
                to = %language,
                "language changed, clearing result cache"
            );
            self.clear();
        }
        self.language = Some(language);
    }

    pub fn get(&mut self, key: Fingerprint) -> Option<AnalysisResult> {
        match self.entries.get(&key) {
            Some(result) => {
                self.stats.hits += 1;
                Some(result.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: Fingerprint, result: AnalysisResult) {
        if self.entries.insert(key, result).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.language = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

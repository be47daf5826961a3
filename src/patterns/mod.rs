//! Algorithmic idiom recognition.
//!
//! Each [`Detector`] scores one named idiom from the feature summary plus,
//! for the pointer-movement idioms, a per-loop view of the token stream.
//! All detectors run; matches at or above the threshold are kept and sorted
//! by confidence, ties keeping registry order.

mod window;

use crate::adapter::{LoopKind, TokenStream};
use crate::core::PatternMatch;
use crate::features::SyntaxFeatureSet;

pub use window::{loop_windows, LoopWindow};

/// Everything a detector may look at.
pub struct Evidence<'a> {
    pub features: &'a SyntaxFeatureSet,
    pub windows: Vec<LoopWindow>,
}

impl<'a> Evidence<'a> {
    pub fn new(features: &'a SyntaxFeatureSet, tokens: &TokenStream) -> Self {
        Self {
            features,
            windows: loop_windows(tokens),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    BinarySearch,
    TwoPointers,
    SlidingWindow,
    DynamicProgramming,
    DivideAndConquer,
    Backtracking,
    HashMapLookup,
    Greedy,
    NestedLoop,
    Recursion,
    LinearScan,
}

/// Most specific detectors first.
pub const REGISTRY: [Detector; 11] = [
    Detector::BinarySearch,
    Detector::TwoPointers,
    Detector::SlidingWindow,
    Detector::DynamicProgramming,
    Detector::DivideAndConquer,
    Detector::Backtracking,
    Detector::HashMapLookup,
    Detector::Greedy,
    Detector::NestedLoop,
    Detector::Recursion,
    Detector::LinearScan,
];

impl Detector {
    pub fn name(self) -> &'static str {
        match self {
            Detector::BinarySearch => "Binary Search",
            Detector::TwoPointers => "Two Pointers",
            Detector::SlidingWindow => "Sliding Window",
            Detector::DynamicProgramming => "Dynamic Programming",
            Detector::DivideAndConquer => "Divide and Conquer",
            Detector::Backtracking => "Backtracking",
            Detector::HashMapLookup => "Hash Map Lookup",
            Detector::Greedy => "Greedy",
            Detector::NestedLoop => "Nested Loop",
            Detector::Recursion => "Recursion",
            Detector::LinearScan => "Linear Scan",
        }
    }

    /// Confidence in `[0, 1]`; zero means no match.
    ///
    /// Each arm reads only the feature summary and the loop windows; the
    /// fixed values order detectors against each other.
    pub fn confidence(self, evidence: &Evidence<'_>) -> f64 {
        let f = evidence.features;
        match self {
            // A search loop halves its range and decides inside its own
            // body, or is the outer loop of its function. Halving
            // recursion with a single call site also counts.
            Detector::BinarySearch => {
                let halving_loop = f.search_loops > 0;
                let halving_recursion = f
                    .recursive_functions()
                    .any(|func| func.recursive_sites == 1 && func.halving);
                match (halving_loop, halving_recursion) {
                    (true, _) if f.conditional_branch_count > 0 => 0.9,
                    (true, _) => 0.7,
                    (false, true) => 0.8,
                    (false, false) => 0.0,
                }
            }
            // Two indices walking toward each other.
            Detector::TwoPointers => {
                if evidence.windows.iter().any(LoopWindow::converges) {
                    0.85
                } else {
                    0.0
                }
            }
            // An inner loop shrinking the window an outer loop grows, or two
            // indices advancing in step.
            Detector::SlidingWindow => {
                let shrinking_inner = evidence.windows.iter().any(|w| {
                    w.kind != LoopKind::Conditional
                        && w.children
                            .iter()
                            .any(|&child| evidence.windows[child].shrinks_window())
                });
                if shrinking_inner {
                    0.8
                } else if evidence.windows.iter().any(LoopWindow::advances_together) {
                    0.7
                } else {
                    0.0
                }
            }
            // Memoized recursion, or a table filled by loops.
            Detector::DynamicProgramming => {
                if f.has_memoization {
                    0.9
                } else if f.matrix_allocations > 0 && f.memo_table_accesses > 0 {
                    0.85
                } else if f.memo_table_accesses > 0 && f.has_loops() {
                    0.7
                } else {
                    0.0
                }
            }
            Detector::DivideAndConquer => {
                if f.recursive_functions()
                    .any(|func| func.recursive_sites >= 2 && (func.halving || func.divides))
                {
                    0.85
                } else {
                    0.0
                }
            }
            // Push, recurse, pop scores highest; unmemoized recursion from a
            // loop is a weaker hint.
            Detector::Backtracking => {
                if f.recursive_functions().any(|func| func.backtracks) {
                    0.9
                } else if f
                    .recursive_functions()
                    .any(|func| func.sites_in_loop > 0 && !func.memoized)
                {
                    0.65
                } else {
                    0.0
                }
            }
            Detector::HashMapLookup => match (f.uses_hashing(), f.hash_lookups > 0) {
                (true, true) => 0.85,
                (true, false) if f.structure_inserts > 0 => 0.6,
                (false, true) => 0.55,
                _ => 0.0,
            },
            // One pass after a sort, or one pass tracking a running min/max.
            Detector::Greedy => {
                let single_pass = f.loop_profile.linear_depth == 1 && !f.has_recursion();
                if single_pass && f.sort_call_depth == Some(0) {
                    0.7
                } else if single_pass && f.min_max_calls_in_loops > 0 {
                    0.6
                } else {
                    0.0
                }
            }
            Detector::NestedLoop => {
                if f.loop_profile.linear_depth >= 2 {
                    0.95
                } else {
                    0.0
                }
            }
            Detector::Recursion => {
                if f.has_recursion() {
                    0.8
                } else {
                    0.0
                }
            }
            // Exactly one linear level with nothing else going on.
            Detector::LinearScan => {
                let plain = f.loop_profile.linear_depth == 1
                    && f.loop_profile.log_depth == 0
                    && !f.has_recursion()
                    && f.sort_call_depth.is_none();
                match (plain, f.loop_count) {
                    (false, _) => 0.0,
                    (true, 1) => 0.9,
                    (true, _) => 0.75,
                }
            }
        }
    }
}

/// Run every detector and keep matches at or above `threshold`.
pub fn recognize(
    features: &SyntaxFeatureSet,
    tokens: &TokenStream,
    threshold: f64,
) -> Vec<PatternMatch> {
    let evidence = Evidence::new(features, tokens);
    let mut matches: Vec<PatternMatch> = REGISTRY
        .iter()
        .map(|detector| PatternMatch {
            name: detector.name(),
            confidence: detector.confidence(&evidence).clamp(0.0, 1.0),
        })
        .filter(|m| m.confidence > 0.0 && m.confidence >= threshold)
        .collect();
    // Stable: equal confidences keep registry order.
    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    tracing::debug!(
        matched = matches.len(),
        names = ?matches.iter().map(|m| m.name).collect::<Vec<_>>(),
        "recognized patterns"
    );
    matches
}

//! Inefficiency signatures and the advice they produce.
//!
//! [`Inefficiency`] is the rule table shared by the suggestion generator and
//! the score calculator: detection lives here, penalties live in
//! [`ScoringConfig`](crate::config::ScoringConfig).

use crate::complexity::{rule, Inference};
use crate::config::LimitsConfig;
use crate::core::{ComplexityClass, PatternMatch};
use crate::features::SyntaxFeatureSet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Inefficiency {
    ExponentialRecursion,
    DeepNesting,
    NestedLoop,
    LinearMembership,
    SortInLoop,
    CallStackGrowth,
    QuadraticSpace,
    ExcessiveBranching,
}

impl Inefficiency {
    /// Table order; also the tie-break when two rules promise the same drop.
    pub const ALL: [Inefficiency; 8] = [
        Inefficiency::ExponentialRecursion,
        Inefficiency::DeepNesting,
        Inefficiency::NestedLoop,
        Inefficiency::LinearMembership,
        Inefficiency::SortInLoop,
        Inefficiency::CallStackGrowth,
        Inefficiency::QuadraticSpace,
        Inefficiency::ExcessiveBranching,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Inefficiency::ExponentialRecursion => "exponential-recursion",
            Inefficiency::DeepNesting => "deep-nesting",
            Inefficiency::NestedLoop => "nested-loop",
            Inefficiency::LinearMembership => "linear-membership",
            Inefficiency::SortInLoop => "sort-in-loop",
            Inefficiency::CallStackGrowth => "call-stack-growth",
            Inefficiency::QuadraticSpace => "quadratic-space",
            Inefficiency::ExcessiveBranching => "excessive-branching",
        }
    }

    /// Complexity ranks the fix is expected to save.
    pub fn promised_drop(self) -> u8 {
        match self {
            Inefficiency::ExponentialRecursion
            | Inefficiency::LinearMembership
            | Inefficiency::CallStackGrowth
            | Inefficiency::QuadraticSpace => 2,
            Inefficiency::DeepNesting | Inefficiency::NestedLoop | Inefficiency::SortInLoop => 1,
            Inefficiency::ExcessiveBranching => 0,
        }
    }

    pub fn suggestion(self) -> &'static str {
        match self {
            Inefficiency::ExponentialRecursion => {
                "Cache the results of overlapping recursive calls (memoization) so each subproblem is solved once."
            }
            Inefficiency::DeepNesting => {
                "Flatten deeply nested loops: precompute or index the inner data so fewer loops run per element."
            }
            Inefficiency::NestedLoop => {
                "Replace the inner loop with a hash map or set lookup so each element is compared in constant time."
            }
            Inefficiency::LinearMembership => {
                "Store the searched values in a hash set (or map) once and test membership against it instead of scanning a list."
            }
            Inefficiency::SortInLoop => {
                "Sort once before the loop, or keep the data in a heap or balanced tree, instead of re-sorting every iteration."
            }
            Inefficiency::CallStackGrowth => {
                "Rewrite the recursion iteratively (or with an explicit stack) to avoid deep call stacks."
            }
            Inefficiency::QuadraticSpace => {
                "Keep only the rows of the table you still need; a rolling array usually suffices."
            }
            Inefficiency::ExcessiveBranching => {
                "Simplify the branching: a lookup table or early returns make the control flow easier to follow."
            }
        }
    }

    pub fn optimization(self) -> &'static str {
        match self {
            Inefficiency::ExponentialRecursion => {
                "Memoize or convert to bottom-up dynamic programming: exponential time becomes polynomial."
            }
            Inefficiency::DeepNesting => {
                "Reduce loop depth by one level with a precomputed index or prefix sums."
            }
            Inefficiency::NestedLoop => {
                "Single pass with a hash map: O(n^2) comparisons become O(n)."
            }
            Inefficiency::LinearMembership => {
                "Hash-based membership checks: each lookup drops from O(n) to O(1)."
            }
            Inefficiency::SortInLoop => {
                "Hoist the sort out of the loop: one O(n log n) sort instead of one per iteration."
            }
            Inefficiency::CallStackGrowth => {
                "Iterative rewrite or tail recursion: O(n) stack space becomes O(1)."
            }
            Inefficiency::QuadraticSpace => {
                "Rolling-array dynamic programming: O(n^2) memory becomes O(n)."
            }
            Inefficiency::ExcessiveBranching => {
                "Replace long conditional chains with a dispatch table."
            }
        }
    }

    /// Score-detail wording: why points were lost, not what to do.
    pub fn rationale(self, inference: &Inference) -> String {
        match self {
            Inefficiency::ExponentialRecursion => format!(
                "recursion branches without caching, giving {} time",
                inference.time.class
            ),
            Inefficiency::DeepNesting => "loops nested three or more levels deep".to_string(),
            Inefficiency::NestedLoop => format!(
                "nested loops over the input drive time to {}",
                inference.time.class
            ),
            Inefficiency::LinearMembership => {
                "membership is checked by scanning a list inside a loop".to_string()
            }
            Inefficiency::SortInLoop => "the data is re-sorted on every loop iteration".to_string(),
            Inefficiency::CallStackGrowth => format!(
                "recursion depth grows with the input, using {} stack space",
                inference.space.class
            ),
            Inefficiency::QuadraticSpace => {
                "a two-dimensional table is allocated for the whole input".to_string()
            }
            Inefficiency::ExcessiveBranching => "many conditional branches".to_string(),
        }
    }

    fn matches(
        self,
        features: &SyntaxFeatureSet,
        inference: &Inference,
        limits: &LimitsConfig,
    ) -> bool {
        match self {
            Inefficiency::ExponentialRecursion => {
                inference.time.class == ComplexityClass::Exponential
                    && features.recursive_functions().any(|f| {
                        (f.recursive_sites >= 2 || f.sites_in_loop > 0) && !f.memoized
                    })
            }
            Inefficiency::DeepNesting => features.loop_profile.linear_depth >= 3,
            Inefficiency::NestedLoop => {
                features.max_loop_nesting_depth >= 2 && features.loop_profile.linear_depth >= 2
            }
            // Element-by-element comparison across two loops is the
            // nested-loop signature; this rule is for explicit searches.
            Inefficiency::LinearMembership => features.linear_searches_in_loops > 0,
            Inefficiency::SortInLoop => features.sort_call_depth.is_some_and(|d| d > 0),
            Inefficiency::CallStackGrowth => inference.space.derivation.contains(&rule::CALL_STACK),
            Inefficiency::QuadraticSpace => features.matrix_allocations > 0,
            Inefficiency::ExcessiveBranching => {
                features.conditional_branch_count > limits.branch_threshold
            }
        }
    }
}

/// Matched inefficiencies in table order.
pub fn detect(
    features: &SyntaxFeatureSet,
    inference: &Inference,
    limits: &LimitsConfig,
) -> Vec<Inefficiency> {
    Inefficiency::ALL
        .into_iter()
        .filter(|rule| rule.matches(features, inference, limits))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub suggestions: Vec<String>,
    pub optimizations: Vec<String>,
    pub matched: Vec<Inefficiency>,
}

/// Ranked, deduplicated, truncated advice for one analysis.
///
/// `patterns` only shapes the wording of the positive suggestion given when
/// no rule matches; detection reads features and inference alone.
pub fn advise(
    features: &SyntaxFeatureSet,
    inference: &Inference,
    patterns: &[PatternMatch],
    limits: &LimitsConfig,
) -> Advice {
    let mut matched = detect(features, inference, limits);
    matched.dedup();
    let mut ranked = matched.clone();
    // Stable: equal drops keep table order.
    ranked.sort_by_key(|rule| std::cmp::Reverse(rule.promised_drop()));

    if ranked.is_empty() {
        let approach = patterns
            .first()
            .map_or_else(|| "this approach".to_string(), |p| format!("this {} approach", p.name));
        let positive = format!(
            "No common inefficiencies detected; {} time looks appropriate for {approach}.",
            inference.time.class
        );
        return Advice {
            suggestions: vec![positive]
                .into_iter()
                .take(limits.suggestion_limit())
                .collect(),
            optimizations: Vec::new(),
            matched,
        };
    }

    let suggestions = ranked
        .iter()
        .map(|rule| rule.suggestion().to_string())
        .take(limits.suggestion_limit())
        .collect();
    let optimizations = ranked
        .iter()
        .map(|rule| rule.optimization().to_string())
        .take(limits.optimization_limit())
        .collect();

    tracing::debug!(
        matched = ?matched.iter().map(|r| r.id()).collect::<Vec<_>>(),
        "generated advice"
    );
    Advice {
        suggestions,
        optimizations,
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complexity::infer;
    use crate::features::{FunctionProfile, LoopProfile};
    use pretty_assertions::assert_eq;

    fn nested(depth: usize) -> SyntaxFeatureSet {
        SyntaxFeatureSet {
            loop_count: depth,
            max_loop_nesting_depth: depth,
            loop_profile: LoopProfile {
                linear_depth: depth,
                log_depth: 0,
            },
            ..SyntaxFeatureSet::default()
        }
    }

    fn advise_default(features: &SyntaxFeatureSet) -> Advice {
        let inference = infer(features);
        advise(features, &inference, &[], &LimitsConfig::default())
    }

    #[test]
    fn test_ids_are_unique_and_kebab_case() {
        let mut ids: Vec<_> = Inefficiency::ALL.iter().map(|r| r.id()).collect();
        assert!(ids.iter().all(|id| id.chars().all(|c| c.is_ascii_lowercase() || c == '-')));
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Inefficiency::ALL.len());
    }

    #[test]
    fn test_nested_comparison_is_one_nested_loop_match() {
        let mut features = nested(2);
        features.nested_equality_checks = 1;
        let advice = advise_default(&features);
        assert_eq!(advice.matched, vec![Inefficiency::NestedLoop]);
        assert_eq!(advice.suggestions, vec![Inefficiency::NestedLoop.suggestion()]);
        assert!(advice.suggestions[0].contains("hash"));
    }

    #[test]
    fn test_explicit_search_in_loop_is_linear_membership() {
        let mut features = nested(2);
        features.linear_searches_in_loops = 1;
        let advice = advise_default(&features);
        assert!(advice.matched.contains(&Inefficiency::LinearMembership));
        // Larger promised drop first.
        assert_eq!(advice.suggestions[0], Inefficiency::LinearMembership.suggestion());
    }

    #[test]
    fn test_exponential_recursion_ranks_first() {
        let mut features = nested(3);
        features.recursive_call_count = 2;
        features.functions.push(FunctionProfile {
            name: "f".into(),
            recursive_sites: 2,
            ..FunctionProfile::default()
        });
        let advice = advise_default(&features);
        assert_eq!(advice.matched[0], Inefficiency::ExponentialRecursion);
        assert_eq!(
            advice.suggestions[0],
            Inefficiency::ExponentialRecursion.suggestion()
        );
        assert!(advice.matched.contains(&Inefficiency::CallStackGrowth));
        assert!(advice.matched.contains(&Inefficiency::DeepNesting));
    }

    #[test]
    fn test_clean_code_gets_one_positive_suggestion() {
        let advice = advise_default(&nested(1));
        assert!(advice.matched.is_empty());
        assert_eq!(advice.suggestions.len(), 1);
        assert!(advice.suggestions[0].contains("O(n)"));
        assert!(advice.optimizations.is_empty());
    }

    #[test]
    fn test_positive_suggestion_names_top_pattern() {
        let features = nested(1);
        let inference = infer(&features);
        let patterns = [PatternMatch {
            name: "Linear Scan",
            confidence: 0.9,
        }];
        let advice = advise(&features, &inference, &patterns, &LimitsConfig::default());
        assert!(advice.suggestions[0].contains("this Linear Scan approach"));
    }

    #[test]
    fn test_lists_respect_limits() {
        let mut features = nested(4);
        features.linear_searches_in_loops = 2;
        features.sort_call_depth = Some(2);
        features.matrix_allocations = 1;
        features.conditional_branch_count = 40;
        features.recursive_call_count = 2;
        features.functions.push(FunctionProfile {
            name: "f".into(),
            recursive_sites: 2,
            ..FunctionProfile::default()
        });
        let inference = infer(&features);
        let limits = LimitsConfig {
            max_suggestions: 2,
            ..LimitsConfig::default()
        };
        let advice = advise(&features, &inference, &[], &limits);
        assert_eq!(advice.suggestions.len(), 2);
        assert_eq!(advice.optimizations.len(), 5);
        assert!(advice.matched.len() > 5);
    }

    #[test]
    fn test_branch_threshold_is_configurable() {
        let features = SyntaxFeatureSet {
            conditional_branch_count: 4,
            ..SyntaxFeatureSet::default()
        };
        let inference = infer(&features);
        let strict = LimitsConfig {
            branch_threshold: 3,
            ..LimitsConfig::default()
        };
        assert_eq!(
            detect(&features, &inference, &strict),
            vec![Inefficiency::ExcessiveBranching]
        );
        assert!(detect(&features, &inference, &LimitsConfig::default()).is_empty());
    }
}

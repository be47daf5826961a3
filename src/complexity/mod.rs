//! Complexity inference.
//!
//! Rules are grouped in families (loops, recursion, sorting for time; one
//! family for space). Inside a family the first matching rule wins. When
//! several families match, the most expensive class is reported.

use crate::core::{ComplexityClass, ComplexityEstimate};
use crate::features::{FunctionProfile, SyntaxFeatureSet};
use serde::Serialize;

/// Rule ids recorded in [`ComplexityEstimate::derivation`].
pub mod rule {
    pub const HALVING_LOOP: &str = "time.halving-loop";
    pub const LOOP_NESTING: &str = "time.loop-nesting";
    pub const DEPTH_CAPPED: &str = "time.depth-capped";
    pub const LINEAR_SEARCH_IN_LOOP: &str = "time.linear-search-in-loop";

    pub const MEMOIZED_RECURSION: &str = "time.memoized-recursion";
    pub const RECURSION_IN_LOOP: &str = "time.recursion-in-loop";
    pub const DIVIDE_AND_CONQUER: &str = "time.divide-and-conquer";
    pub const EXPONENTIAL_RECURSION: &str = "time.exponential-recursion";
    pub const HALVING_RECURSION: &str = "time.halving-recursion";
    pub const RECURSION_WITH_LOOP: &str = "time.recursion-with-loop";
    pub const LINEAR_RECURSION: &str = "time.linear-recursion";

    pub const SORT_CALL: &str = "time.sort-call";
    pub const SORT_IN_LOOP: &str = "time.sort-in-loop";

    pub const CONSTANT_TIME: &str = "time.constant";
    pub const HIGHEST_CLASS_WINS: &str = "time.highest-class-wins";

    pub const MATRIX: &str = "space.matrix";
    pub const COLLECTION_GROWTH: &str = "space.collection-growth";
    pub const CALL_STACK: &str = "space.call-stack";
    pub const CALL_STACK_LOG: &str = "space.call-stack-log";
    pub const TAIL_CALL: &str = "space.tail-call";
    pub const CONSTANT_SPACE: &str = "space.constant";
}

/// Deepest polynomial the display vocabulary has a name for.
const MAX_DISPLAY_DEGREE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    pub time: ComplexityEstimate,
    pub space: ComplexityEstimate,
}

/// Outcome of one rule family.
#[derive(Debug)]
struct Verdict {
    class: ComplexityClass,
    rules: Vec<&'static str>,
}

pub fn infer(features: &SyntaxFeatureSet) -> Inference {
    let inference = Inference {
        time: infer_time(features),
        space: infer_space(features),
    };
    tracing::debug!(
        time = %inference.time.class,
        space = %inference.space.class,
        rules = ?inference.time.derivation,
        "inferred complexity"
    );
    inference
}

fn infer_time(features: &SyntaxFeatureSet) -> ComplexityEstimate {
    let verdicts: Vec<Verdict> = [
        loop_family(features),
        recursion_family(features),
        sort_family(features),
    ]
    .into_iter()
    .flatten()
    .collect();

    combine(verdicts, rule::CONSTANT_TIME, Some(rule::HIGHEST_CLASS_WINS))
}

fn infer_space(features: &SyntaxFeatureSet) -> ComplexityEstimate {
    let mut verdicts = Vec::new();

    if features.matrix_allocations > 0 {
        verdicts.push(Verdict {
            class: ComplexityClass::Quadratic,
            rules: vec![rule::MATRIX],
        });
    } else if features.structure_count() > 0 && (features.has_loops() || features.has_recursion())
    {
        verdicts.push(Verdict {
            class: ComplexityClass::Linear,
            rules: vec![rule::COLLECTION_GROWTH],
        });
    }

    if let Some(stack) = features
        .recursive_functions()
        .map(call_stack)
        .max_by_key(|v| v.class)
    {
        verdicts.push(stack);
    }

    combine(verdicts, rule::CONSTANT_SPACE, None)
}

/// Picks the most expensive verdict. Derivation keeps every contributing
/// rule in evaluation order.
fn combine(
    verdicts: Vec<Verdict>,
    fallback: &'static str,
    tie_break: Option<&'static str>,
) -> ComplexityEstimate {
    let Some(class) = verdicts.iter().map(|v| v.class).max() else {
        return ComplexityEstimate::new(ComplexityClass::Constant, vec![fallback]);
    };
    let several = verdicts.len() > 1;
    let mut derivation: Vec<&'static str> =
        verdicts.into_iter().flat_map(|v| v.rules).collect();
    if several {
        if let Some(id) = tie_break {
            derivation.push(id);
        }
    }
    ComplexityEstimate::new(class, derivation)
}

/// Names `n^linear · log^log n`. Log factors survive only next to at most
/// one linear factor; above that the polynomial term is reported alone, so
/// `n^2 log n` is `O(n^2)` whether it comes from loops or a sort in a loop.
fn dominant_term(linear: usize, log: usize) -> ComplexityClass {
    match (linear, log) {
        (0, 0) => ComplexityClass::Constant,
        (0, _) => ComplexityClass::Logarithmic,
        (1, log) if log > 0 => ComplexityClass::Linearithmic,
        (linear, _) => ComplexityClass::polynomial(linear),
    }
}

fn loop_family(features: &SyntaxFeatureSet) -> Option<Verdict> {
    let profile = features.loop_profile;
    if profile.is_empty() {
        return None;
    }

    let mut rules = Vec::new();
    let class = dominant_term(profile.linear_depth, profile.log_depth);
    match (profile.linear_depth, profile.log_depth) {
        (0, _) => rules.push(rule::HALVING_LOOP),
        (1, log) if log > 0 => rules.push(rule::HALVING_LOOP),
        (depth, _) => {
            rules.push(rule::LOOP_NESTING);
            if depth > MAX_DISPLAY_DEGREE {
                rules.push(rule::DEPTH_CAPPED);
            }
        }
    }
    if features.linear_searches_in_loops > 0 {
        rules.push(rule::LINEAR_SEARCH_IN_LOOP);
    }

    Some(Verdict { class, rules })
}

fn recursion_family(features: &SyntaxFeatureSet) -> Option<Verdict> {
    features
        .recursive_functions()
        .map(recursion_rule)
        .max_by_key(|v| v.class)
}

fn recursion_rule(function: &FunctionProfile) -> Verdict {
    let branching = function.recursive_sites;
    let fans_out = branching >= 2 || function.sites_in_loop > 0;

    let (class, id) = if fans_out && function.memoized {
        (ComplexityClass::Quadratic, rule::MEMOIZED_RECURSION)
    } else if function.sites_in_loop > 0 {
        (ComplexityClass::Exponential, rule::RECURSION_IN_LOOP)
    } else if branching >= 2 && (function.halving || function.divides) {
        (ComplexityClass::Linearithmic, rule::DIVIDE_AND_CONQUER)
    } else if branching >= 2 {
        (ComplexityClass::Exponential, rule::EXPONENTIAL_RECURSION)
    } else if function.halving {
        (ComplexityClass::Logarithmic, rule::HALVING_RECURSION)
    } else if function.loop_depth > 0 {
        (
            ComplexityClass::polynomial(function.loop_depth + 1),
            rule::RECURSION_WITH_LOOP,
        )
    } else {
        (ComplexityClass::Linear, rule::LINEAR_RECURSION)
    };

    Verdict {
        class,
        rules: vec![id],
    }
}

fn sort_family(features: &SyntaxFeatureSet) -> Option<Verdict> {
    let depth = features.sort_call_depth?;
    // A sort under `depth` loops costs n^depth · n log n.
    let class = dominant_term(depth + 1, 1);
    let id = if depth == 0 {
        rule::SORT_CALL
    } else {
        rule::SORT_IN_LOOP
    };
    Some(Verdict {
        class,
        rules: vec![id],
    })
}

fn call_stack(function: &FunctionProfile) -> Verdict {
    match (function.tail_only, function.halving) {
        (true, _) => Verdict {
            class: ComplexityClass::Constant,
            rules: vec![rule::TAIL_CALL],
        },
        (false, true) => Verdict {
            class: ComplexityClass::Logarithmic,
            rules: vec![rule::CALL_STACK_LOG],
        },
        (false, false) => Verdict {
            class: ComplexityClass::Linear,
            rules: vec![rule::CALL_STACK],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StructureKind;
    use crate::features::LoopProfile;
    use pretty_assertions::assert_eq;

    fn loops(linear_depth: usize, log_depth: usize) -> SyntaxFeatureSet {
        SyntaxFeatureSet {
            loop_count: linear_depth + log_depth,
            max_loop_nesting_depth: linear_depth + log_depth,
            loop_profile: LoopProfile {
                linear_depth,
                log_depth,
            },
            ..SyntaxFeatureSet::default()
        }
    }

    fn recursive(sites: usize) -> FunctionProfile {
        FunctionProfile {
            name: "f".into(),
            recursive_sites: sites,
            ..FunctionProfile::default()
        }
    }

    fn with_function(function: FunctionProfile) -> SyntaxFeatureSet {
        SyntaxFeatureSet {
            recursive_call_count: function.recursive_sites,
            recursive_branching_factor: function.recursive_sites,
            function_count: 1,
            functions: vec![function],
            ..SyntaxFeatureSet::default()
        }
    }

    #[test]
    fn test_no_loops_no_recursion_is_constant() {
        let inference = infer(&SyntaxFeatureSet::default());
        assert_eq!(inference.time.class, ComplexityClass::Constant);
        assert_eq!(inference.time.derivation, vec![rule::CONSTANT_TIME]);
        assert_eq!(inference.space.derivation, vec![rule::CONSTANT_SPACE]);
    }

    #[test]
    fn test_loop_depth_maps_to_polynomial() {
        assert_eq!(infer(&loops(1, 0)).time.class, ComplexityClass::Linear);
        assert_eq!(infer(&loops(2, 0)).time.class, ComplexityClass::Quadratic);
        let deep = infer(&loops(5, 0)).time;
        assert_eq!(deep.class, ComplexityClass::Cubic);
        assert_eq!(deep.derivation, vec![rule::LOOP_NESTING, rule::DEPTH_CAPPED]);
    }

    #[test]
    fn test_halving_loops() {
        assert_eq!(infer(&loops(0, 1)).time.class, ComplexityClass::Logarithmic);
        assert_eq!(infer(&loops(1, 1)).time.class, ComplexityClass::Linearithmic);
        assert_eq!(infer(&loops(2, 1)).time.class, ComplexityClass::Quadratic);
    }

    #[test]
    fn test_branching_recursion_is_exponential_until_memoized() {
        let plain = infer(&with_function(recursive(2)));
        assert_eq!(plain.time.class, ComplexityClass::Exponential);
        assert_eq!(plain.space.class, ComplexityClass::Linear);

        let memo = infer(&with_function(FunctionProfile {
            memoized: true,
            ..recursive(2)
        }));
        assert_eq!(memo.time.class, ComplexityClass::Quadratic);
        assert_eq!(memo.time.derivation, vec![rule::MEMOIZED_RECURSION]);
    }

    #[test]
    fn test_single_site_recursion_variants() {
        assert_eq!(
            infer(&with_function(recursive(1))).time.class,
            ComplexityClass::Linear
        );
        let halving = infer(&with_function(FunctionProfile {
            halving: true,
            tail_only: true,
            ..recursive(1)
        }));
        assert_eq!(halving.time.class, ComplexityClass::Logarithmic);
        assert_eq!(halving.space.class, ComplexityClass::Constant);
        assert_eq!(halving.space.derivation, vec![rule::TAIL_CALL]);

        let looping = infer(&with_function(FunctionProfile {
            loop_depth: 1,
            ..recursive(1)
        }));
        assert_eq!(looping.time.class, ComplexityClass::Quadratic);
    }

    #[test]
    fn test_divide_and_conquer() {
        let inference = infer(&with_function(FunctionProfile {
            divides: true,
            ..recursive(2)
        }));
        assert_eq!(inference.time.class, ComplexityClass::Linearithmic);
        assert_eq!(inference.space.derivation, vec![rule::CALL_STACK]);
    }

    #[test]
    fn test_recursion_in_loop_is_exponential() {
        let inference = infer(&with_function(FunctionProfile {
            sites_in_loop: 1,
            loop_depth: 1,
            ..recursive(1)
        }));
        assert_eq!(inference.time.class, ComplexityClass::Exponential);
    }

    #[test]
    fn test_pessimistic_tie_break_across_families() {
        let mut features = with_function(recursive(2));
        features.loop_count = 2;
        features.loop_profile = LoopProfile {
            linear_depth: 2,
            log_depth: 0,
        };
        let time = infer(&features).time;
        assert_eq!(time.class, ComplexityClass::Exponential);
        assert_eq!(
            time.derivation,
            vec![
                rule::LOOP_NESTING,
                rule::EXPONENTIAL_RECURSION,
                rule::HIGHEST_CLASS_WINS
            ]
        );
    }

    #[test]
    fn test_sort_calls() {
        let sorted = SyntaxFeatureSet {
            sort_call_depth: Some(0),
            ..SyntaxFeatureSet::default()
        };
        assert_eq!(infer(&sorted).time.class, ComplexityClass::Linearithmic);

        let mut in_loop = loops(1, 0);
        in_loop.sort_call_depth = Some(1);
        assert_eq!(infer(&in_loop).time.class, ComplexityClass::Quadratic);
    }

    #[test]
    fn test_log_factor_rounding_is_shared() {
        // n^2 log n from two loops around a halving loop.
        let halving_inside = infer(&loops(2, 1)).time.class;
        // n^2 log n from a sort inside one loop.
        let mut sort_inside = loops(1, 0);
        sort_inside.sort_call_depth = Some(1);
        assert_eq!(halving_inside, ComplexityClass::Quadratic);
        assert_eq!(infer(&sort_inside).time.class, halving_inside);

        // Only a single linear factor keeps its log.
        assert_eq!(infer(&loops(1, 2)).time.class, ComplexityClass::Linearithmic);
        assert_eq!(dominant_term(0, 0), ComplexityClass::Constant);
    }

    #[test]
    fn test_space_rules() {
        let mut grow = loops(1, 0);
        grow.data_structure_usage.insert(StructureKind::Array, 1);
        assert_eq!(infer(&grow).space.class, ComplexityClass::Linear);
        assert_eq!(infer(&grow).space.derivation, vec![rule::COLLECTION_GROWTH]);

        grow.matrix_allocations = 1;
        assert_eq!(infer(&grow).space.class, ComplexityClass::Quadratic);

        // A structure with no loop or recursion does not grow with input.
        let mut fixed = SyntaxFeatureSet::default();
        fixed.data_structure_usage.insert(StructureKind::HashMap, 1);
        assert_eq!(infer(&fixed).space.class, ComplexityClass::Constant);
    }
}

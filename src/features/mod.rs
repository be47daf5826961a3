//! Structural feature summary derived from a [`TokenStream`].
//!
//! [`extract`] walks the tokens once, keeping a stack of open loops and a
//! stack of open functions. Loop facts that depend on a loop's whole body
//! (whether its bound is halved) are settled when the loop closes and folded
//! into the parent.

use crate::adapter::keywords::{DIVIDE_HELPERS, MIN_MAX};
use crate::adapter::{LoopKind, StructureKind, StructureOp, Token, TokenStream};
use serde::Serialize;
use std::collections::BTreeMap;

/// Worst nesting path through the loop tree, split into linear and
/// logarithmic factors. Compared lexicographically: linear factors dominate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct LoopProfile {
    pub linear_depth: usize,
    pub log_depth: usize,
}

impl LoopProfile {
    pub fn is_empty(&self) -> bool {
        self.linear_depth == 0 && self.log_depth == 0
    }
}

/// Per-function recursion facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionProfile {
    pub name: String,
    /// Independent recursive call sites in the body.
    pub recursive_sites: usize,
    /// Recursive call sites that sit inside a loop of this function.
    pub sites_in_loop: usize,
    /// Deepest loop nesting inside the function, relative to it.
    pub loop_depth: usize,
    /// The argument is halved somewhere in the body.
    pub halving: bool,
    /// Cache decorator, or a branch on a cache lookup before the first
    /// recursive call.
    pub memoized: bool,
    /// Every recursive call is in tail position.
    pub tail_only: bool,
    /// Calls a merge/partition helper.
    pub divides: bool,
    /// Push, recurse, pop.
    pub backtracks: bool,
}

impl FunctionProfile {
    pub fn is_recursive(&self) -> bool {
        self.recursive_sites > 0
    }
}

/// Counts and shapes read off one source unit. Every complexity rule,
/// pattern detector and inefficiency rule works from this summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxFeatureSet {
    pub max_loop_nesting_depth: usize,
    /// Self-call sites across all functions.
    pub recursive_call_count: usize,
    /// Largest number of recursive call sites in one function.
    pub recursive_branching_factor: usize,
    /// Constructions and keyed operations per structure kind.
    pub data_structure_usage: BTreeMap<StructureKind, usize>,
    pub conditional_branch_count: usize,
    /// Some recursive function is memoized.
    pub has_memoization: bool,
    pub function_count: usize,

    pub loop_count: usize,
    pub loop_profile: LoopProfile,
    /// Halving loops that are outermost in their function or branch in
    /// their own body. A halving counter buried under other loops is not a
    /// search.
    pub search_loops: usize,
    /// Deepest loop level at which a sort call happens.
    pub sort_call_depth: Option<usize>,
    pub linear_searches_in_loops: usize,
    /// Equality comparisons at loop depth two or more.
    pub nested_equality_checks: usize,
    pub min_max_calls_in_loops: usize,
    /// Constructions with two or more dimensions.
    pub matrix_allocations: usize,
    pub structure_inserts: usize,
    /// Indexing into memo-named tables.
    pub memo_table_accesses: usize,
    pub hash_lookups: usize,
    /// Named functions in closing order.
    pub functions: Vec<FunctionProfile>,
}

impl SyntaxFeatureSet {
    pub fn has_loops(&self) -> bool {
        self.loop_count > 0
    }

    pub fn has_recursion(&self) -> bool {
        self.recursive_call_count > 0
    }

    pub fn structure_count(&self) -> usize {
        self.data_structure_usage.values().sum()
    }

    pub fn uses_hashing(&self) -> bool {
        self.data_structure_usage
            .keys()
            .any(|kind| kind.is_hashed())
    }

    pub fn recursive_functions(&self) -> impl Iterator<Item = &FunctionProfile> {
        self.functions.iter().filter(|f| f.is_recursive())
    }
}

#[derive(Debug)]
struct OpenLoop {
    kind: LoopKind,
    halving_in_header: bool,
    direct_halving: bool,
    direct_unit_step: bool,
    /// Linear searches directly in this body act as one more linear level.
    direct_search: bool,
    direct_branch: bool,
    worst_child: LoopProfile,
}

impl OpenLoop {
    fn new(kind: LoopKind) -> Self {
        Self {
            kind,
            halving_in_header: false,
            direct_halving: false,
            direct_unit_step: false,
            direct_search: false,
            direct_branch: false,
            worst_child: LoopProfile::default(),
        }
    }

    fn is_halving(&self) -> bool {
        match self.kind {
            LoopKind::Counted => self.halving_in_header,
            LoopKind::Conditional => self.direct_halving && !self.direct_unit_step,
            LoopKind::Iteration => false,
        }
    }

    /// Worst path through this loop, itself included.
    fn close(self) -> LoopProfile {
        let mut inner = self.worst_child;
        if self.direct_search {
            inner = inner.max(LoopProfile {
                linear_depth: 1,
                log_depth: 0,
            });
        }
        if self.is_halving() {
            inner.log_depth += 1;
        } else {
            inner.linear_depth += 1;
        }
        inner
    }
}

#[derive(Debug)]
struct OpenFunction {
    profile: FunctionProfile,
    named: bool,
    /// Loop depth outside the function when it opened.
    base_depth: usize,
    guard_seen: bool,
    inserted: bool,
    recursed_after_insert: bool,
}

struct Walker {
    features: SyntaxFeatureSet,
    hashed_in_unit: bool,
    /// The previous token opened a branch condition.
    after_branch: bool,
    loops: Vec<OpenLoop>,
    functions: Vec<OpenFunction>,
    pending_decorator: bool,
}

/// Derives the feature summary for one token stream.
pub fn extract(tokens: &TokenStream) -> SyntaxFeatureSet {
    // Membership tests are hash lookups only when the unit builds a map or set.
    let hashed_in_unit = tokens.iter().any(|t| {
        matches!(t, Token::Structure { kind: Some(kind), .. } if kind.is_hashed())
    });
    let mut walker = Walker {
        features: SyntaxFeatureSet::default(),
        hashed_in_unit,
        after_branch: false,
        loops: Vec::new(),
        functions: Vec::new(),
        pending_decorator: false,
    };
    for token in tokens {
        walker.visit(token);
    }
    walker.finish()
}

impl Walker {
    fn depth(&self) -> usize {
        self.loops.len()
    }

    fn visit(&mut self, token: &Token) {
        match token {
            Token::LoopOpen(kind) => {
                self.features.loop_count += 1;
                self.loops.push(OpenLoop::new(*kind));
                let depth = self.depth();
                self.features.max_loop_nesting_depth =
                    self.features.max_loop_nesting_depth.max(depth);
                if let Some(function) = self.functions.last_mut() {
                    let relative = depth.saturating_sub(function.base_depth);
                    function.profile.loop_depth = function.profile.loop_depth.max(relative);
                }
            }
            Token::LoopClose => self.close_loop(),
            Token::FunctionOpen { name } => {
                self.features.function_count += 1;
                let memoized = std::mem::take(&mut self.pending_decorator);
                self.functions.push(OpenFunction {
                    profile: FunctionProfile {
                        name: name.clone().unwrap_or_default(),
                        memoized,
                        tail_only: true,
                        ..FunctionProfile::default()
                    },
                    named: name.is_some(),
                    base_depth: self.depth(),
                    guard_seen: false,
                    inserted: false,
                    recursed_after_insert: false,
                });
            }
            Token::FunctionClose => self.close_function(),
            Token::MemoDecorator => self.pending_decorator = true,
            Token::Halving { in_header } => {
                if let Some(open) = self.loops.last_mut() {
                    open.direct_halving = true;
                    open.halving_in_header |= *in_header;
                }
                if let Some(function) = self.functions.last_mut() {
                    function.profile.halving = true;
                }
            }
            Token::Step { delta, .. } => {
                if delta.abs() == 1 {
                    if let Some(open) = self.loops.last_mut() {
                        open.direct_unit_step = true;
                    }
                }
            }
            Token::RecursiveCall { name, tail } => self.recursive_call(name, *tail),
            Token::Call { name } => {
                if MIN_MAX.contains(&name.as_str()) && self.depth() > 0 {
                    self.features.min_max_calls_in_loops += 1;
                }
                if DIVIDE_HELPERS.contains(&name.as_str()) {
                    if let Some(function) = self.functions.last_mut() {
                        function.profile.divides = true;
                    }
                }
            }
            Token::SortCall => {
                let depth = self.depth();
                self.features.sort_call_depth =
                    Some(self.features.sort_call_depth.map_or(depth, |d| d.max(depth)));
            }
            Token::Branch(_) => {
                self.features.conditional_branch_count += 1;
                if let Some(open) = self.loops.last_mut() {
                    open.direct_branch = true;
                }
            }
            Token::Equality => {
                if self.depth() >= 2 {
                    self.features.nested_equality_checks += 1;
                }
            }
            Token::Structure { kind, op, dims } => self.structure(*kind, *op, *dims),
        }
        self.after_branch = matches!(token, Token::Branch(_));
    }

    fn close_loop(&mut self) {
        let Some(open) = self.loops.pop() else {
            return;
        };
        let outermost = self.depth() == self.functions.last().map_or(0, |f| f.base_depth);
        if open.is_halving() && (outermost || open.direct_branch) {
            self.features.search_loops += 1;
        }
        let path = open.close();
        match self.loops.last_mut() {
            Some(parent) => parent.worst_child = parent.worst_child.max(path),
            None => self.features.loop_profile = self.features.loop_profile.max(path),
        }
    }

    fn close_function(&mut self) {
        let Some(function) = self.functions.pop() else {
            return;
        };
        let mut profile = function.profile;
        if !profile.is_recursive() {
            profile.tail_only = false;
        }
        if function.named {
            self.features.functions.push(profile);
        }
    }

    fn recursive_call(&mut self, name: &str, tail: bool) {
        self.features.recursive_call_count += 1;
        let depth = self.depth();
        let Some(function) = self
            .functions
            .iter_mut()
            .rev()
            .find(|f| f.named && f.profile.name == name)
        else {
            return;
        };
        let profile = &mut function.profile;
        if profile.recursive_sites == 0 && function.guard_seen {
            profile.memoized = true;
        }
        profile.recursive_sites += 1;
        if depth > function.base_depth {
            profile.sites_in_loop += 1;
        }
        profile.tail_only &= tail;
        if function.inserted {
            function.recursed_after_insert = true;
        }
    }

    fn structure(&mut self, kind: Option<StructureKind>, op: StructureOp, dims: u8) {
        let depth = self.depth();
        let counts_as_usage = matches!(
            op,
            StructureOp::Construct | StructureOp::Insert | StructureOp::Remove | StructureOp::Lookup
        );
        if let (Some(kind), true) = (kind, counts_as_usage) {
            *self.features.data_structure_usage.entry(kind).or_insert(0) += 1;
        }

        match op {
            StructureOp::Construct if dims >= 2 => self.features.matrix_allocations += 1,
            StructureOp::Construct => {}
            StructureOp::Insert => {
                self.features.structure_inserts += 1;
                if let Some(function) = self.functions.last_mut() {
                    function.inserted = true;
                }
            }
            StructureOp::Remove => {
                if let Some(function) = self.functions.last_mut() {
                    if function.recursed_after_insert {
                        function.profile.backtracks = true;
                    }
                }
            }
            StructureOp::Lookup => {
                self.features.hash_lookups += 1;
                if kind.is_some_and(StructureKind::is_hashed) || self.hashed_in_unit {
                    self.mark_guard();
                }
            }
            StructureOp::TableAccess => {
                self.features.memo_table_accesses += 1;
                self.mark_guard();
            }
            StructureOp::Membership if self.hashed_in_unit => {
                self.features.hash_lookups += 1;
                self.mark_guard();
            }
            StructureOp::Membership | StructureOp::Search => {
                if depth > 0 {
                    self.features.linear_searches_in_loops += 1;
                    if let Some(open) = self.loops.last_mut() {
                        open.direct_search = true;
                    }
                }
            }
        }
    }

    /// A cache probe counts as a guard only as a branch condition.
    fn mark_guard(&mut self) {
        if !self.after_branch {
            return;
        }
        for function in &mut self.functions {
            if function.profile.recursive_sites == 0 {
                function.guard_seen = true;
            }
        }
    }

    fn finish(mut self) -> SyntaxFeatureSet {
        while !self.loops.is_empty() {
            self.close_loop();
        }
        while !self.functions.is_empty() {
            self.close_function();
        }
        let features = &mut self.features;
        features.recursive_branching_factor = features
            .functions
            .iter()
            .map(|f| f.recursive_sites)
            .max()
            .unwrap_or(0);
        features.has_memoization = features
            .functions
            .iter()
            .any(|f| f.is_recursive() && f.memoized);
        self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::tokenize;
    use crate::core::Language;
    use indoc::indoc;

    fn features(source: &str, language: Language) -> SyntaxFeatureSet {
        extract(&tokenize(source, language).unwrap())
    }

    #[test]
    fn test_nested_loops_record_depth_and_equality() {
        let f = features(
            indoc! {"
                def dup(arr, arr2):
                    for i in arr:
                        for j in arr2:
                            if arr[i] == arr2[j]:
                                return True
                    return False
            "},
            Language::Python,
        );
        assert_eq!(f.max_loop_nesting_depth, 2);
        assert_eq!(
            f.loop_profile,
            LoopProfile {
                linear_depth: 2,
                log_depth: 0
            }
        );
        assert_eq!(f.nested_equality_checks, 1);
        assert_eq!(f.conditional_branch_count, 1);
        assert_eq!(f.function_count, 1);
    }

    #[test]
    fn test_binary_search_loop_is_logarithmic() {
        let f = features(
            indoc! {"
                def search(a, t):
                    lo, hi = 0, len(a) - 1
                    while lo <= hi:
                        mid = (lo + hi) // 2
                        if a[mid] == t:
                            return mid
                        elif a[mid] < t:
                            lo = mid + 1
                        else:
                            hi = mid - 1
                    return -1
            "},
            Language::Python,
        );
        assert_eq!(
            f.loop_profile,
            LoopProfile {
                linear_depth: 0,
                log_depth: 1
            }
        );
        assert_eq!(f.search_loops, 1);
    }

    #[test]
    fn test_halving_counter_under_nested_loops_is_not_a_search() {
        let f = features(
            indoc! {"
                void grid(int n) {
                    for (int i = 0; i < n; i++) {
                        for (int j = 0; j < n; j++) {
                            int k = n;
                            while (k > 1) {
                                k /= 2;
                            }
                        }
                    }
                }
            "},
            Language::Java,
        );
        assert_eq!(f.loop_profile.log_depth, 1);
        assert_eq!(f.search_loops, 0);
    }

    #[test]
    fn test_outermost_halving_loop_is_a_search() {
        let f = features(
            indoc! {"
                def halve(n):
                    while n > 1:
                        n //= 2
                    return n
            "},
            Language::Python,
        );
        assert_eq!(f.search_loops, 1);
    }

    #[test]
    fn test_fibonacci_branching() {
        let f = features(
            indoc! {"
                function fib(n) {
                    if (n < 2) return n;
                    return fib(n - 1) + fib(n - 2);
                }
            "},
            Language::JavaScript,
        );
        assert_eq!(f.recursive_call_count, 2);
        assert_eq!(f.recursive_branching_factor, 2);
        assert!(!f.has_memoization);
        assert_eq!(f.functions[0].name, "fib");
        assert!(!f.functions[0].tail_only);
    }

    #[test]
    fn test_memo_guard_before_recursion() {
        let f = features(
            indoc! {"
                def fib(n, memo={}):
                    if n in memo:
                        return memo[n]
                    if n < 2:
                        return n
                    memo[n] = fib(n - 1, memo) + fib(n - 2, memo)
                    return memo[n]
            "},
            Language::Python,
        );
        assert!(f.has_memoization);
        assert!(f.memo_table_accesses >= 1);
    }

    #[test]
    fn test_map_has_in_condition_is_a_guard() {
        let f = features(
            indoc! {"
                const memo = new Map();
                function ways(n) {
                    if (memo.has(n)) return memo.get(n);
                    if (n < 2) return 1;
                    const v = ways(n - 1) + ways(n - 2);
                    memo.set(n, v);
                    return v;
                }
            "},
            Language::JavaScript,
        );
        assert!(f.has_memoization);
    }

    #[test]
    fn test_option_lookup_before_recursion_is_not_a_guard() {
        let f = features(
            indoc! {r#"
                def count(n, opts):
                    limit = opts.get("limit")
                    if n < 2:
                        return 1
                    return count(n - 1, opts) + count(n - 2, opts)
            "#},
            Language::Python,
        );
        assert_eq!(f.hash_lookups, 1);
        assert!(!f.has_memoization);
        assert!(!f.functions[0].memoized);
    }

    #[test]
    fn test_list_get_before_recursion_is_not_a_guard() {
        let f = features(
            indoc! {"
                int f(List<Integer> a, int n) {
                    int first = a.get(0);
                    if (n < 2) return first;
                    return f(a, n - 1) + f(a, n - 2);
                }
            "},
            Language::Java,
        );
        assert_eq!(f.recursive_branching_factor, 2);
        assert!(!f.has_memoization);
    }

    #[test]
    fn test_cache_read_outside_a_condition_is_not_a_guard() {
        let f = features(
            indoc! {"
                def fib(n, memo={}):
                    known = memo.get(n)
                    if n < 2:
                        return n
                    return fib(n - 1, memo) + fib(n - 2, memo)
            "},
            Language::Python,
        );
        assert!(f.uses_hashing());
        assert!(!f.has_memoization);
    }

    #[test]
    fn test_decorator_memoizes() {
        let f = features(
            indoc! {"
                @lru_cache(maxsize=None)
                def ways(n):
                    if n <= 1:
                        return 1
                    return ways(n - 1) + ways(n - 2)
            "},
            Language::Python,
        );
        assert!(f.has_memoization);
    }

    #[test]
    fn test_membership_without_hashing_is_a_linear_search() {
        let f = features(
            indoc! {"
                def common(a, b):
                    out = []
                    for x in a:
                        if x in b:
                            out.append(x)
                    return out
            "},
            Language::Python,
        );
        assert_eq!(f.linear_searches_in_loops, 1);
        assert_eq!(f.loop_profile.linear_depth, 2);
        assert_eq!(f.data_structure_usage.get(&StructureKind::Array), Some(&2));
    }

    #[test]
    fn test_membership_with_a_set_is_a_lookup() {
        let f = features(
            indoc! {"
                def common(a, b):
                    seen = set(b)
                    return [x for x in a if x in seen]
            "},
            Language::Python,
        );
        assert_eq!(f.linear_searches_in_loops, 0);
        assert_eq!(f.hash_lookups, 1);
        assert!(f.uses_hashing());
    }

    #[test]
    fn test_backtracking_shape() {
        let f = features(
            indoc! {"
                def perms(nums, path, out):
                    if len(path) == len(nums):
                        out.append(path[:])
                        return
                    for n in nums:
                        path.append(n)
                        perms(nums, path, out)
                        path.pop()
            "},
            Language::Python,
        );
        let profile = &f.functions[0];
        assert!(profile.backtracks);
        assert_eq!(profile.sites_in_loop, 1);
    }
}

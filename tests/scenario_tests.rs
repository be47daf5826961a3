//! End-to-end scenarios through `Analyzer::analyze`.

use algoscope::config::ScoringConfig;
use algoscope::{Analyzer, ErrorKind, Language};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn analyze(source: &str, language: Language) -> algoscope::AnalysisResult {
    Analyzer::default()
        .analyze(source, language)
        .expect("analysis should succeed")
}

#[test]
fn test_empty_and_blank_input_are_rejected() {
    let analyzer = Analyzer::default();
    for (source, language) in [("", Language::Python), ("   ", Language::JavaScript)] {
        let err = analyzer.analyze(source, language).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyInput);
    }
}

#[test]
fn test_straight_line_function_is_constant() {
    let result = analyze(
        indoc! {"
            def area(w, h):
                if w < 0 or h < 0:
                    return 0
                return w * h
        "},
        Language::Python,
    );
    assert_eq!(result.time_complexity, "O(1)");
    assert_eq!(result.space_complexity, "O(1)");
    assert_eq!(result.performance.score, 100);
}

#[test]
fn test_linear_scan_scenario() {
    let result = analyze(
        indoc! {"
            def total(arr):
                s = 0
                for x in arr:
                    s += x
                return s
        "},
        Language::Python,
    );
    assert_eq!(result.time_complexity, "O(n)");
    assert_eq!(result.space_complexity, "O(1)");
    assert_eq!(result.patterns, vec!["Linear Scan".to_string()]);
    assert!(result.performance.score >= 90);
    assert_eq!(result.suggestions.len(), 1);
}

#[test]
fn test_nested_membership_scenario() {
    let result = analyze(
        indoc! {"
            def common(arr, arr2):
                for i in arr:
                    for j in arr2:
                        if arr[i] == arr2[j]:
                            return True
                return False
        "},
        Language::Python,
    );
    assert_eq!(result.time_complexity, "O(n^2)");
    assert!(result.patterns.iter().any(|p| p == "Nested Loop"));
    assert!(
        result
            .suggestions
            .iter()
            .any(|s| s.to_lowercase().contains("hash")),
        "expected a hash-based rewrite in {:?}",
        result.suggestions
    );

    // Penalized once, by the nested-loop rule alone.
    let nested_penalty = ScoringConfig::default().nested_loop;
    assert_eq!(u32::from(result.performance.score), 100 - nested_penalty);
    assert_eq!(result.performance.details.len(), 1);
    assert!(result.performance.details[0].starts_with(&format!("-{nested_penalty}:")));
}

#[test]
fn test_search_call_inside_loop_is_linear_membership() {
    let result = analyze(
        indoc! {"
            function shared(a, b) {
                const out = [];
                for (const x of a) {
                    if (b.includes(x)) out.push(x);
                }
                return out;
            }
        "},
        Language::JavaScript,
    );
    let scoring = ScoringConfig::default();
    assert!(result
        .performance
        .details
        .iter()
        .any(|d| d.starts_with(&format!("-{}:", scoring.linear_membership))));
}

#[test]
fn test_exponential_recursion_and_memoized_variant() {
    let plain = analyze(
        indoc! {"
            def fib(n):
                if n < 2:
                    return n
                return fib(n - 1) + fib(n - 2)
        "},
        Language::Python,
    );
    assert_eq!(plain.time_complexity, "O(2^n)");
    assert_eq!(plain.space_complexity, "O(n)");
    assert!(plain.patterns.iter().any(|p| p == "Recursion"));

    let memoized = analyze(
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
    assert_eq!(memoized.time_complexity, "O(n^2)");
    assert!(memoized.performance.score > plain.performance.score);
}

#[test]
fn test_unrelated_lookup_before_recursion_stays_exponential() {
    let python = analyze(
        indoc! {r#"
            def count(n, opts):
                limit = opts.get("limit")
                if n < 2:
                    return 1
                return count(n - 1, opts) + count(n - 2, opts)
        "#},
        Language::Python,
    );
    assert_eq!(python.time_complexity, "O(2^n)");
    assert!(!python.patterns.iter().any(|p| p == "Dynamic Programming"));

    let java = analyze(
        indoc! {"
            int f(List<Integer> a, int n) {
                int first = a.get(0);
                if (n < 2) return first;
                return f(a, n - 1) + f(a, n - 2);
            }
        "},
        Language::Java,
    );
    assert_eq!(java.time_complexity, "O(2^n)");
    assert!(!java.patterns.iter().any(|p| p == "Dynamic Programming"));
}

#[test]
fn test_map_guard_in_javascript_memoizes() {
    let result = analyze(
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
    assert_ne!(result.time_complexity, "O(2^n)");
    assert!(result.patterns.iter().any(|p| p == "Dynamic Programming"));
}

#[test]
fn test_halving_loop_under_nested_loops_is_not_binary_search() {
    let result = analyze(
        indoc! {"
            def grid(a):
                for i in a:
                    for j in a:
                        k = len(a)
                        while k > 1:
                            k //= 2
        "},
        Language::Python,
    );
    assert!(result.patterns.iter().any(|p| p == "Nested Loop"));
    assert!(!result.patterns.iter().any(|p| p == "Binary Search"));
}

#[test]
fn test_binary_search_is_logarithmic() {
    let result = analyze(
        indoc! {"
            int search(int[] a, int t) {
                int lo = 0, hi = a.length - 1;
                while (lo <= hi) {
                    int mid = (lo + hi) / 2;
                    if (a[mid] == t) return mid;
                    if (a[mid] < t) lo = mid + 1; else hi = mid - 1;
                }
                return -1;
            }
        "},
        Language::Java,
    );
    assert_eq!(result.time_complexity, "O(log n)");
    assert_eq!(result.patterns, vec!["Binary Search".to_string()]);
    assert_eq!(result.performance.score, 100);
}

#[test]
fn test_results_are_deterministic_across_analyzers() {
    let source = "function f(a) { for (const x of a) { for (const y of a) { if (x === y) g(); } } }";
    let first = Analyzer::default().analyze(source, Language::JavaScript);
    let second = Analyzer::default().analyze(source, Language::JavaScript);
    assert_eq!(first, second);
}

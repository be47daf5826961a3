//! Performance score.
//!
//! Starts at 100 and subtracts the configured penalty of every matched
//! inefficiency, saturating at 0. Details name each deduction, largest first.

use crate::advice::Inefficiency;
use crate::complexity::Inference;
use crate::config::ScoringConfig;
use crate::core::PerformanceReport;

pub const BASELINE: u32 = 100;

pub fn score(
    inference: &Inference,
    matched: &[Inefficiency],
    weights: &ScoringConfig,
) -> PerformanceReport {
    let mut deductions: Vec<(u32, Inefficiency)> = matched
        .iter()
        .map(|rule| (weights.penalty(*rule), *rule))
        .filter(|(penalty, _)| *penalty > 0)
        .collect();
    // Stable: equal penalties keep table order.
    deductions.sort_by_key(|(penalty, _)| std::cmp::Reverse(*penalty));

    let total: u32 = deductions.iter().map(|(penalty, _)| *penalty).sum();
    let score = BASELINE.saturating_sub(total).min(BASELINE) as u8;
    let details = deductions
        .iter()
        .map(|(penalty, rule)| format!("-{penalty}: {}", rule.rationale(inference)))
        .collect();

    tracing::debug!(score, deducted = total, "scored analysis");
    PerformanceReport { score, details }
}

use crate::core::{AnalysisResult, ErrorResult, Outcome};
use colored::Colorize;
use std::fmt::Write;

pub fn render(outcome: &Outcome) -> String {
    match outcome {
        Ok(result) => render_result(result),
        Err(error) => render_error(error),
    }
}

fn render_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let score = result.performance.score;
    let score_text = format!("{score}/100");
    let score_text = match score {
        80..=100 => score_text.green(),
        50..=79 => score_text.yellow(),
        _ => score_text.red(),
    };

    let _ = writeln!(out, "{}", "Complexity".bold().underline());
    let _ = writeln!(out, "  Time:  {}", result.time_complexity.cyan());
    let _ = writeln!(out, "  Space: {}", result.space_complexity.cyan());
    let _ = writeln!(out);
    let _ = writeln!(out, "{} {}", "Performance".bold().underline(), score_text.bold());
    for detail in &result.performance.details {
        let _ = writeln!(out, "  {}", detail.dimmed());
    }

    section(&mut out, "Patterns", &result.patterns);
    section(&mut out, "Suggestions", &result.suggestions);
    section(&mut out, "Optimizations", &result.optimizations);
    out
}

fn section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.bold().underline());
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn render_error(error: &ErrorResult) -> String {
    format!("{} {}\n", format!("{}:", error.kind).red().bold(), error.message)
}

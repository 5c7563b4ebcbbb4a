//! Human-readable rendering of an evaluation's reasoning tree

use claimwise_domain::Evaluation;
use std::fmt::Write;

/// Render an evaluation as a plain-text factor breakdown
///
/// One line per factor plus a header with the outcome, confidence, and
/// coverage tier. Meant for logs, CLI output, and audit review; the
/// structured tree stays in [`Evaluation::steps`].
pub fn render_breakdown(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Decision: {} (confidence {:.2}, coverage {:.0}%)",
        evaluation.outcome.as_str(),
        evaluation.confidence,
        evaluation.coverage_ratio * 100.0
    );

    for step in &evaluation.steps {
        let marker = if step.passed { "+" } else { "-" };
        let _ = writeln!(
            out,
            "  [{}] {:<20} {:.2} x {:.2} = {:.3}  {}",
            marker,
            step.factor.as_str(),
            step.weight,
            step.value,
            step.weight * step.value,
            step.detail
        );
    }

    if !evaluation.risk_factors.is_empty() {
        let tags: Vec<&str> = evaluation.risk_factors.iter().map(|r| r.as_str()).collect();
        let _ = writeln!(out, "  risks: {}", tags.join(", "));
    }

    out
}

//! The weighted-factor claim evaluator
//!
//! `evaluate` is a pure function of its inputs; ids and timestamps belong
//! to the persistence layer. Every factor produces a reasoning step, so
//! the tree always shows what was considered, including unset fields that
//! contributed nothing.

use crate::config::DecisionPolicy;
use claimwise_domain::{
    ChunkId, DecisionOutcome, Evaluation, Factor, ReasoningStep, RetrievalResult, RiskFactor,
    StructuredQuery,
};
use tracing::debug;

const EXCLUSION_MARKERS: [&str; 4] = ["not covered", "excluded", "exclusion", "does not cover"];
const COVERAGE_MARKERS: [&str; 5] = ["covered", "covers", "cashless", "included", "payable"];

/// Claimants below this age get a reduced (not rejected) age score
const YOUNG_RISK_AGE: u32 = 25;
/// Claimants above this age are tagged as senior
const SENIOR_RISK_AGE: u32 = 70;
/// Policies younger than this many months are tagged short-tenure
const SHORT_TENURE_MONTHS: u32 = 6;

/// Evaluate a structured query against retrieved clauses
///
/// `stated_limit` is the claim limit resolved from the context's clauses;
/// the policy default applies when no clause states one.
pub fn evaluate(
    query: &StructuredQuery,
    retrieval: &RetrievalResult,
    stated_limit: Option<u64>,
    policy: &DecisionPolicy,
) -> Evaluation {
    let limit = stated_limit.unwrap_or(policy.default_policy_limit);

    let age_step = score_age(query, policy);
    let procedure_step = score_procedure(query, retrieval, policy);
    let location_step = score_location(query, policy);
    let duration_step = score_duration(query, policy);
    let (amount_step, over_limit) = score_amount(query, limit, policy);

    let steps = vec![age_step, procedure_step, location_step, duration_step, amount_step];
    let confidence: f64 = steps.iter().map(|s| s.weight * s.value).sum();

    let minor_complex = matches!(query.age, Some(age) if age < policy.minor_age)
        && query.procedure.as_ref().map(|p| p.is_complex()).unwrap_or(false);

    let outcome = if over_limit || minor_complex || confidence < policy.reject_threshold {
        DecisionOutcome::Rejected
    } else {
        DecisionOutcome::Approved
    };

    let coverage_ratio = match outcome {
        DecisionOutcome::Rejected => 0.0,
        DecisionOutcome::Approved => {
            if confidence >= policy.full_tier_threshold {
                policy.full_tier_coverage
            } else if confidence >= policy.standard_tier_threshold {
                policy.standard_tier_coverage
            } else {
                policy.minimum_tier_coverage
            }
        }
    };

    let risk_factors = tag_risks(query, policy);

    debug!(
        confidence,
        outcome = outcome.as_str(),
        coverage_ratio,
        "Evaluated claim query"
    );

    Evaluation {
        outcome,
        coverage_ratio,
        confidence,
        risk_factors,
        steps,
    }
}

fn step(factor: Factor, weight: f64, value: f64, detail: String, chunks: Vec<ChunkId>) -> ReasoningStep {
    ReasoningStep {
        factor,
        weight,
        value,
        passed: value >= 0.5,
        detail,
        supporting_chunks: chunks,
    }
}

fn score_age(query: &StructuredQuery, policy: &DecisionPolicy) -> ReasoningStep {
    let weight = policy.weights.age;
    let (value, detail) = match query.age {
        None => (0.0, "age not provided".to_string()),
        Some(age) if age < policy.minor_age => {
            (0.5, format!("claimant is a minor (age {})", age))
        }
        Some(age) if age <= 60 => (1.0, format!("age {} in standard range", age)),
        Some(age) if age <= 70 => (0.8, format!("age {} above standard range", age)),
        Some(age) => (0.6, format!("age {} in senior range", age)),
    };
    step(Factor::AgeAppropriateness, weight, value, detail, Vec::new())
}

fn score_procedure(
    query: &StructuredQuery,
    retrieval: &RetrievalResult,
    policy: &DecisionPolicy,
) -> ReasoningStep {
    let weight = policy.weights.procedure;
    let Some(procedure) = &query.procedure else {
        return step(
            Factor::ProcedureCoverage,
            weight,
            0.0,
            "procedure not provided".to_string(),
            Vec::new(),
        );
    };

    if procedure.category.is_none() {
        return step(
            Factor::ProcedureCoverage,
            weight,
            0.4,
            format!("procedure '{}' outside the known taxonomy", procedure.name),
            Vec::new(),
        );
    }

    // Exclusion and coverage language only counts within the sentence
    // that names the procedure; a chunk may carry clauses about several
    // procedures at once
    let name = procedure.name.to_lowercase();
    let mut supporting = Vec::new();
    let mut excluded = false;
    let mut covered = false;
    for retrieved in retrieval.authoritative() {
        let text = retrieved.chunk.text.to_lowercase();
        let mut mentioned = false;
        for sentence in text.split(['.', '!', '?', '\n']) {
            if !mentions_procedure(sentence, &name) {
                continue;
            }
            mentioned = true;
            if EXCLUSION_MARKERS.iter().any(|m| sentence.contains(m)) {
                excluded = true;
            } else if COVERAGE_MARKERS.iter().any(|m| sentence.contains(m)) {
                covered = true;
            }
        }
        if mentioned {
            supporting.push(retrieved.chunk.id);
        }
    }

    let (value, detail) = if excluded {
        (0.1, format!("clauses exclude {}", procedure.name))
    } else if covered {
        (1.0, format!("clauses cover {}", procedure.name))
    } else {
        (0.5, format!("{} recognized but no covering clause retrieved", procedure.name))
    };
    step(Factor::ProcedureCoverage, weight, value, detail, supporting)
}

// Clause text rarely repeats the canonical name verbatim; match on the
// leading word ("knee", "cataract") as well as the full name
fn mentions_procedure(text: &str, name: &str) -> bool {
    if text.contains(name) {
        return true;
    }
    name.split_whitespace()
        .next()
        .map(|head| head.len() >= 4 && text.contains(head))
        .unwrap_or(false)
}

fn score_location(query: &StructuredQuery, policy: &DecisionPolicy) -> ReasoningStep {
    let weight = policy.weights.location;
    let (value, detail) = match &query.location {
        None => (0.0, "location not provided".to_string()),
        Some(city) if policy.is_network_city(city) => {
            (0.8, format!("{} has network hospitals", city))
        }
        Some(city) => (0.5, format!("{} outside the hospital network", city)),
    };
    step(Factor::LocationNetwork, weight, value, detail, Vec::new())
}

fn score_duration(query: &StructuredQuery, policy: &DecisionPolicy) -> ReasoningStep {
    let weight = policy.weights.duration;
    let Some(months) = query.policy_duration_months else {
        return step(
            Factor::PolicyDuration,
            weight,
            0.0,
            "policy duration not provided".to_string(),
            Vec::new(),
        );
    };

    let waiting = query
        .procedure
        .as_ref()
        .map(|p| p.waiting_period_months())
        .unwrap_or(0);
    let (value, detail) = if months >= waiting {
        (
            1.0,
            format!("policy active {} months, waiting period {} met", months, waiting),
        )
    } else {
        (
            0.05,
            format!(
                "policy active {} months, waiting period {} not met",
                months, waiting
            ),
        )
    };
    step(Factor::PolicyDuration, weight, value, detail, Vec::new())
}

fn score_amount(
    query: &StructuredQuery,
    limit: u64,
    policy: &DecisionPolicy,
) -> (ReasoningStep, bool) {
    let weight = policy.weights.amount;
    let Some(amount) = query.claim_amount else {
        return (
            step(
                Factor::ClaimAmount,
                weight,
                0.0,
                "claim amount not provided".to_string(),
                Vec::new(),
            ),
            false,
        );
    };

    let (value, detail, over) = if amount > limit {
        (
            0.0,
            format!("amount {} exceeds policy limit {}", amount, limit),
            true,
        )
    } else if amount.saturating_mul(2) <= limit {
        (
            1.0,
            format!("amount {} well within policy limit {}", amount, limit),
            false,
        )
    } else {
        (
            0.8,
            format!("amount {} approaches policy limit {}", amount, limit),
            false,
        )
    };
    (
        step(Factor::ClaimAmount, weight, value, detail, Vec::new()),
        over,
    )
}

fn tag_risks(query: &StructuredQuery, policy: &DecisionPolicy) -> Vec<RiskFactor> {
    let mut risks = Vec::new();
    if let Some(age) = query.age {
        if age < YOUNG_RISK_AGE {
            risks.push(RiskFactor::YoungClaimant);
        }
        if age > SENIOR_RISK_AGE {
            risks.push(RiskFactor::SeniorClaimant);
        }
    }
    if query.procedure.as_ref().map(|p| p.is_complex()).unwrap_or(false) {
        risks.push(RiskFactor::ComplexProcedure);
    }
    if let Some(amount) = query.claim_amount {
        if amount >= policy.high_value_threshold {
            risks.push(RiskFactor::HighValueClaim);
        }
    }
    if let Some(months) = query.policy_duration_months {
        if months < SHORT_TENURE_MONTHS {
            risks.push(RiskFactor::ShortPolicyTenure);
        }
    }
    risks
}

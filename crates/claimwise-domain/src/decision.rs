//! Decision results, reasoning steps, and the audit payload

use crate::feedback::FeedbackRecord;
use crate::ids::{ChunkId, ContextId, DecisionId};
use crate::query::StructuredQuery;
use serde::{Deserialize, Serialize};

/// Final outcome of a claim evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Claim accepted at some coverage tier
    Approved,
    /// Claim rejected
    Rejected,
}

impl DecisionOutcome {
    /// Outcome as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Rejected => "rejected",
        }
    }

    /// Parse an outcome from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approved" => Some(DecisionOutcome::Approved),
            "rejected" => Some(DecisionOutcome::Rejected),
            _ => None,
        }
    }
}

/// The closed set of factors the evaluator scores
///
/// Every factor appears in the reasoning tree for every decision, including
/// those that contributed zero, so an auditor sees what was not considered
/// as well as what was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Age appropriateness for the claimed procedure
    AgeAppropriateness,
    /// Likelihood the procedure is covered, adjusted by retrieved clauses
    ProcedureCoverage,
    /// Treatment location network fit
    LocationNetwork,
    /// Policy tenure against the procedure's waiting period
    PolicyDuration,
    /// Claim amount reasonableness against policy limits
    ClaimAmount,
}

impl Factor {
    /// All factors in evaluation order
    pub const ALL: [Factor; 5] = [
        Factor::AgeAppropriateness,
        Factor::ProcedureCoverage,
        Factor::LocationNetwork,
        Factor::PolicyDuration,
        Factor::ClaimAmount,
    ];

    /// Factor name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::AgeAppropriateness => "age_appropriateness",
            Factor::ProcedureCoverage => "procedure_coverage",
            Factor::LocationNetwork => "location_network",
            Factor::PolicyDuration => "policy_duration",
            Factor::ClaimAmount => "claim_amount",
        }
    }

    /// Parse a factor name produced by [`Factor::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "age_appropriateness" => Some(Factor::AgeAppropriateness),
            "procedure_coverage" => Some(Factor::ProcedureCoverage),
            "location_network" => Some(Factor::LocationNetwork),
            "policy_duration" => Some(Factor::PolicyDuration),
            "claim_amount" => Some(Factor::ClaimAmount),
            _ => None,
        }
    }
}

/// Risk tags attached to a decision
///
/// Tags flag conditions for a reviewer; they do not feed the confidence
/// score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Claimant under 25
    YoungClaimant,
    /// Claimant over 70
    SeniorClaimant,
    /// Procedure in a complex / major-surgery category
    ComplexProcedure,
    /// Claim amount above the high-value threshold
    HighValueClaim,
    /// Policy active for fewer than six months
    ShortPolicyTenure,
}

impl RiskFactor {
    /// Tag name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFactor::YoungClaimant => "young_claimant",
            RiskFactor::SeniorClaimant => "senior_claimant",
            RiskFactor::ComplexProcedure => "complex_procedure",
            RiskFactor::HighValueClaim => "high_value_claim",
            RiskFactor::ShortPolicyTenure => "short_policy_tenure",
        }
    }

    /// Parse a tag name produced by [`RiskFactor::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "young_claimant" => Some(RiskFactor::YoungClaimant),
            "senior_claimant" => Some(RiskFactor::SeniorClaimant),
            "complex_procedure" => Some(RiskFactor::ComplexProcedure),
            "high_value_claim" => Some(RiskFactor::HighValueClaim),
            "short_policy_tenure" => Some(RiskFactor::ShortPolicyTenure),
            _ => None,
        }
    }
}

/// One step of the reasoning tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// The factor this step evaluates
    pub factor: Factor,

    /// Weight the factor carried in the confidence score
    pub weight: f64,

    /// Normalized factor score in [0, 1]
    pub value: f64,

    /// Whether the factor cleared its pass threshold
    pub passed: bool,

    /// Human-readable detail of what was evaluated
    pub detail: String,

    /// Chunks that justified this evaluation, if any
    pub supporting_chunks: Vec<ChunkId>,
}

/// The pure output of the evaluator, before identity and persistence
///
/// Separating the evaluation from the persisted [`DecisionResult`] keeps
/// the evaluator a pure function: identical inputs yield an identical
/// `Evaluation`, while ids and timestamps are stamped on at persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Final outcome
    pub outcome: DecisionOutcome,

    /// Coverage ratio tier in [0, 1]; zero when rejected
    pub coverage_ratio: f64,

    /// Weighted confidence score in [0, 1]
    pub confidence: f64,

    /// Risk tags, in detection order
    pub risk_factors: Vec<RiskFactor>,

    /// The full reasoning tree, one step per factor
    pub steps: Vec<ReasoningStep>,
}

/// A persisted, immutable claim decision
///
/// Superseded only by an explicit feedback override, which creates a new
/// linked revision; the original row is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Unique identifier
    pub id: DecisionId,

    /// Claim context this decision was evaluated in
    pub context_id: ContextId,

    /// The query that was evaluated
    pub query: StructuredQuery,

    /// The evaluation (outcome, confidence, reasoning tree)
    pub evaluation: Evaluation,

    /// Revision number, zero for the original decision
    pub revision: u32,

    /// The decision this revision supersedes, if any
    pub supersedes: Option<DecisionId>,

    /// Creation timestamp (milliseconds since Unix epoch)
    pub created_at: u64,
}

impl DecisionResult {
    /// Build a revision of this decision with an overridden outcome
    ///
    /// The revision keeps the original reasoning tree (the override is a
    /// human judgment layered on top, not a re-evaluation) and links back
    /// via `supersedes`.
    pub fn override_with(&self, outcome: DecisionOutcome, created_at: u64) -> DecisionResult {
        let mut evaluation = self.evaluation.clone();
        evaluation.outcome = outcome;
        if outcome == DecisionOutcome::Rejected {
            evaluation.coverage_ratio = 0.0;
        }
        DecisionResult {
            id: DecisionId::new(),
            context_id: self.context_id,
            query: self.query.clone(),
            evaluation,
            revision: self.revision + 1,
            supersedes: Some(self.id),
            created_at,
        }
    }
}

/// The immutable audit export for one decision
///
/// Bundles the decision, every revision that superseded it, and all
/// feedback records into a single serializable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPayload {
    /// The requested decision
    pub decision: DecisionResult,

    /// Later revisions, oldest first
    pub revisions: Vec<DecisionResult>,

    /// Feedback records, in append order
    pub feedback: Vec<FeedbackRecord>,

    /// Export timestamp (milliseconds since Unix epoch)
    pub exported_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_decision() -> DecisionResult {
        DecisionResult {
            id: DecisionId::new(),
            context_id: ContextId::new(),
            query: StructuredQuery::default(),
            evaluation: Evaluation {
                outcome: DecisionOutcome::Approved,
                coverage_ratio: 0.95,
                confidence: 0.9,
                risk_factors: vec![],
                steps: vec![],
            },
            revision: 0,
            supersedes: None,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_override_links_and_increments_revision() {
        let original = sample_decision();
        let revised = original.override_with(DecisionOutcome::Rejected, 1_700_000_001_000);

        assert_eq!(revised.supersedes, Some(original.id));
        assert_eq!(revised.revision, 1);
        assert_eq!(revised.evaluation.outcome, DecisionOutcome::Rejected);
        assert_eq!(revised.evaluation.coverage_ratio, 0.0);
        // The original is untouched
        assert_eq!(original.evaluation.outcome, DecisionOutcome::Approved);
    }

    #[test]
    fn test_factor_all_covers_every_variant() {
        // The reasoning tree iterates Factor::ALL; a new factor must be
        // added there as well
        assert_eq!(Factor::ALL.len(), 5);
    }

    #[test]
    fn test_outcome_parse_roundtrip() {
        for outcome in [DecisionOutcome::Approved, DecisionOutcome::Rejected] {
            assert_eq!(DecisionOutcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(DecisionOutcome::parse("pending"), None);
    }

    #[test]
    fn test_decision_serde_roundtrip() {
        let decision = sample_decision();
        let json = serde_json::to_string(&decision).unwrap();
        let back: DecisionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(decision, back);
    }
}

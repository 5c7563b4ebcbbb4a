//! End-to-end pipeline scenarios

use claimwise_domain::{
    ClaimRequest, ContextId, DecisionOutcome, DocumentRole, Factor, FeedbackKind, Procedure,
    StructuredQuery,
};
use claimwise_domain::traits::Embedder;
use claimwise_extract::{ExtractConfig, PatternExtractor};
use claimwise_pipeline::{Pipeline, PipelineConfig, PipelineError};
use claimwise_store::{MockEmbedder, SqliteDecisionStore};
use std::time::Duration;

const BASE_POLICY: &str = "\
Health insurance base policy. The sum insured of Rs. 5,00,000 applies per policy year. \
Dental treatment is covered for all insured members. \
Knee replacement and other orthopedic surgery carries a 24 month waiting period. \
Cataract surgery carries a 24 month waiting period. \
Heart surgery is covered after the waiting period for adult members. \
Cosmetic surgery is excluded from coverage. \
Treatment at network hospitals in Pune, Mumbai, Delhi, Bangalore, Chennai, Hyderabad and Kolkata \
is settled cashless.";

fn pipeline() -> Pipeline<MockEmbedder, PatternExtractor> {
    // RUST_LOG controls verbosity when a test needs tracing output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Pipeline::new(
        MockEmbedder::default(),
        PatternExtractor::new(ExtractConfig::default()),
        SqliteDecisionStore::new(":memory:").unwrap(),
        PipelineConfig::default(),
    )
    .unwrap()
}

async fn seeded_context(pipeline: &Pipeline<MockEmbedder, PatternExtractor>) -> ContextId {
    let context = ContextId::new();
    pipeline
        .ingest_document(context, DocumentRole::BasePolicy, BASE_POLICY)
        .await
        .unwrap();
    context
}

#[tokio::test]
async fn test_clean_dental_claim_approved_at_full_tier() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let request = ClaimRequest::FreeText(
        "35-year-old male, dental treatment in Mumbai, 12-month-old insurance policy, Rs. 50,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Approved);
    assert!(decision.evaluation.confidence >= 0.8);
    assert!((decision.evaluation.coverage_ratio - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn test_minor_heart_surgery_rejected_regardless() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let request = ClaimRequest::FreeText(
        "15-year-old male, heart surgery in Mumbai, 36-month-old insurance policy, Rs. 50,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Rejected);
    assert_eq!(decision.evaluation.coverage_ratio, 0.0);
}

#[tokio::test]
async fn test_amount_above_limit_rejected() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let request = ClaimRequest::FreeText(
        "40-year-old male, dental treatment in Mumbai, 12-month-old insurance policy, Rs. 15,00,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Rejected);
}

#[tokio::test]
async fn test_sparse_eye_surgery_claim_rejected_on_confidence() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let request =
        ClaimRequest::FreeText("eye surgery in Chennai, 6-month-old insurance policy".to_string());
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    assert!(decision.evaluation.confidence < 0.3);
    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Rejected);
}

#[tokio::test]
async fn test_unset_procedure_still_yields_decision() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    // No recognizable procedure anywhere in the text
    let request = ClaimRequest::FreeText(
        "35-year-old male in Mumbai, 12-month-old insurance policy".to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    let procedure_step = decision
        .evaluation
        .steps
        .iter()
        .find(|s| s.factor == Factor::ProcedureCoverage)
        .unwrap();
    assert_eq!(procedure_step.value, 0.0);
    assert_eq!(decision.evaluation.steps.len(), Factor::ALL.len());
}

#[tokio::test]
async fn test_structured_request_passthrough() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let query = StructuredQuery {
        age: Some(35),
        gender: None,
        procedure: Some(Procedure::normalize("dental treatment")),
        location: Some("Mumbai".to_string()),
        policy_duration_months: Some(12),
        claim_amount: Some(50_000),
    };
    let decision = pipeline
        .evaluate(context, &ClaimRequest::Structured(query.clone()))
        .await
        .unwrap();

    assert_eq!(decision.query, query);
    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Approved);
}

#[tokio::test]
async fn test_invalid_structured_request_rejected_upfront() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;

    let query = StructuredQuery {
        age: Some(300),
        ..Default::default()
    };
    let result = pipeline
        .evaluate(context, &ClaimRequest::Structured(query))
        .await;
    assert!(matches!(result, Err(PipelineError::Extraction(_))));
}

#[tokio::test]
async fn test_unknown_context_is_an_error() {
    let pipeline = pipeline();
    let request = ClaimRequest::FreeText("dental treatment".to_string());

    let result = pipeline.evaluate(ContextId::new(), &request).await;
    assert!(matches!(result, Err(PipelineError::UnknownContext(_))));
}

#[tokio::test]
async fn test_identical_requests_evaluate_identically() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    let request = ClaimRequest::FreeText(
        "46-year-old male, knee surgery in Pune, 3-month-old insurance policy".to_string(),
    );

    let first = pipeline.evaluate(context, &request).await.unwrap();
    let second = pipeline.evaluate(context, &request).await.unwrap();

    // Fresh identity, identical evaluation
    assert_ne!(first.id, second.id);
    assert_eq!(first.evaluation, second.evaluation);
}

#[tokio::test]
async fn test_amendment_limit_overrides_base_limit() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    pipeline
        .ingest_document(
            context,
            DocumentRole::Amendment,
            "Amendment: the sum insured is reduced to 1,00,000 for all members.",
        )
        .await
        .unwrap();

    // Within the base limit but above the amended one
    let request = ClaimRequest::FreeText(
        "40-year-old male, dental treatment in Mumbai, 12-month-old insurance policy, Rs. 2,00,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Rejected);
}

#[tokio::test]
async fn test_concurrent_and_repeated_ingests_stay_consistent() {
    let pipeline = pipeline();
    let context = ContextId::new();

    let (a, b) = tokio::join!(
        pipeline.ingest_document(context, DocumentRole::BasePolicy, BASE_POLICY),
        pipeline.ingest_document(
            context,
            DocumentRole::Rider,
            "Rider: dental treatment is also covered at network clinics.",
        ),
    );
    a.unwrap();
    b.unwrap();

    // Later ingests keep working after earlier ones released their lock
    pipeline
        .ingest_document(context, DocumentRole::Correspondence, "Noted, thank you.")
        .await
        .unwrap();

    let request = ClaimRequest::FreeText(
        "35-year-old male, dental treatment in Mumbai, 12-month-old insurance policy, Rs. 50,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();
    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Approved);
}

struct SleepyEmbedder {
    delay: Duration,
}

impl Embedder for SleepyEmbedder {
    type Error = std::convert::Infallible;

    fn embed(&self, _text: &str) -> Result<Vec<f32>, Self::Error> {
        std::thread::sleep(self.delay);
        Ok(vec![0.0; 8])
    }

    fn dimension(&self) -> usize {
        8
    }
}

#[tokio::test]
async fn test_stalled_embedder_bounded_by_deadline() {
    let mut config = PipelineConfig::default();
    config.embedding_timeout_secs = 1;
    let pipeline = Pipeline::new(
        SleepyEmbedder {
            delay: Duration::from_secs(5),
        },
        PatternExtractor::new(ExtractConfig::default()),
        SqliteDecisionStore::new(":memory:").unwrap(),
        config,
    )
    .unwrap();

    let context = ContextId::new();
    let result = pipeline
        .ingest_document(context, DocumentRole::BasePolicy, BASE_POLICY)
        .await;

    assert!(matches!(result, Err(PipelineError::EmbeddingTimeout)));
}

#[tokio::test]
async fn test_effective_clauses_rank_amendment_over_base() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    pipeline
        .ingest_document(
            context,
            DocumentRole::Amendment,
            "Amendment: dental treatment now requires prior authorisation.",
        )
        .await
        .unwrap();
    pipeline
        .ingest_document(
            context,
            DocumentRole::Correspondence,
            "As discussed on the phone, dental claims are usually quick.",
        )
        .await
        .unwrap();

    let clauses = pipeline.effective_clauses(context, "dental").unwrap();
    let binding: Vec<_> = clauses.binding().collect();

    assert_eq!(binding[0].role, DocumentRole::Amendment);
    assert!(binding.iter().all(|c| c.role != DocumentRole::Correspondence));
    assert!(clauses
        .clauses
        .iter()
        .any(|c| c.advisory && c.role == DocumentRole::Correspondence));

    let missing = ContextId::new();
    assert!(matches!(
        pipeline.effective_clauses(missing, "dental"),
        Err(PipelineError::UnknownContext(_))
    ));
}

#[tokio::test]
async fn test_feedback_spawns_linked_revision_and_audit_trail() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    let request = ClaimRequest::FreeText(
        "35-year-old male, dental treatment in Mumbai, 12-month-old insurance policy, Rs. 50,000"
            .to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();
    assert_eq!(decision.evaluation.outcome, DecisionOutcome::Approved);

    let revision_id = pipeline
        .record_feedback(
            decision.id,
            DecisionOutcome::Rejected,
            FeedbackKind::Correction,
            "pre-existing condition was not disclosed",
        )
        .await
        .unwrap()
        .expect("differing outcome should spawn a revision");

    let audit = pipeline.export_audit(decision.id).await.unwrap();
    assert_eq!(audit.decision.id, decision.id);
    assert_eq!(audit.decision.evaluation.outcome, DecisionOutcome::Approved);
    assert_eq!(audit.revisions.len(), 1);
    assert_eq!(audit.revisions[0].id, revision_id);
    assert_eq!(audit.revisions[0].evaluation.outcome, DecisionOutcome::Rejected);
    assert_eq!(audit.revisions[0].supersedes, Some(decision.id));
    assert_eq!(audit.feedback.len(), 1);
    assert_eq!(audit.feedback[0].kind, FeedbackKind::Correction);
}

#[tokio::test]
async fn test_agreeing_feedback_spawns_no_revision() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    let request = ClaimRequest::FreeText(
        "35-year-old male, dental treatment in Mumbai, 12-month-old insurance policy".to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();

    let spawned = pipeline
        .record_feedback(
            decision.id,
            decision.evaluation.outcome,
            FeedbackKind::Improvement,
            "outcome fine, explanation could cite the clause",
        )
        .await
        .unwrap();

    assert!(spawned.is_none());
    let audit = pipeline.export_audit(decision.id).await.unwrap();
    assert!(audit.revisions.is_empty());
    assert_eq!(audit.feedback.len(), 1);
}

#[tokio::test]
async fn test_metrics_track_the_whole_flow() {
    let pipeline = pipeline();
    let context = seeded_context(&pipeline).await;
    let request = ClaimRequest::FreeText(
        "35-year-old male, dental treatment in Mumbai, 12-month-old insurance policy".to_string(),
    );
    let decision = pipeline.evaluate(context, &request).await.unwrap();
    pipeline
        .record_feedback(
            decision.id,
            DecisionOutcome::Rejected,
            FeedbackKind::Correction,
            "reject this",
        )
        .await
        .unwrap();

    let metrics = pipeline.metrics();
    assert_eq!(metrics.documents_ingested, 1);
    assert!(metrics.chunks_indexed >= 1);
    assert_eq!(metrics.decisions_evaluated, 1);
    assert_eq!(metrics.approvals, 1);
    assert_eq!(metrics.feedback_recorded, 1);
    assert_eq!(metrics.revisions_spawned, 1);
    assert!(metrics.summary().contains("Documents ingested: 1"));
}

#[tokio::test]
async fn test_feedback_on_unknown_decision_fails() {
    let pipeline = pipeline();
    let result = pipeline
        .record_feedback(
            claimwise_domain::DecisionId::new(),
            DecisionOutcome::Rejected,
            FeedbackKind::BugReport,
            "no such decision",
        )
        .await;
    assert!(matches!(result, Err(PipelineError::DecisionNotFound(_))));
}

//! Metrics collection for pipeline operations

use claimwise_domain::DecisionOutcome;

/// Counters collected while the pipeline runs
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    /// Documents ingested
    pub documents_ingested: usize,

    /// Chunks embedded and indexed
    pub chunks_indexed: usize,

    /// Claims evaluated
    pub decisions_evaluated: usize,

    /// Approvals among evaluated claims
    pub approvals: usize,

    /// Rejections among evaluated claims
    pub rejections: usize,

    /// Feedback records appended
    pub feedback_recorded: usize,

    /// Override revisions spawned by feedback
    pub revisions_spawned: usize,
}

impl PipelineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document ingestion and its chunk count
    pub fn record_ingest(&mut self, chunks: usize) {
        self.documents_ingested += 1;
        self.chunks_indexed += chunks;
    }

    /// Record an evaluated decision
    pub fn record_decision(&mut self, outcome: DecisionOutcome) {
        self.decisions_evaluated += 1;
        match outcome {
            DecisionOutcome::Approved => self.approvals += 1,
            DecisionOutcome::Rejected => self.rejections += 1,
        }
    }

    /// Record feedback, and whether it spawned an override revision
    pub fn record_feedback(&mut self, spawned_revision: bool) {
        self.feedback_recorded += 1;
        if spawned_revision {
            self.revisions_spawned += 1;
        }
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Pipeline Metrics Summary".to_string(),
            "========================".to_string(),
            format!(
                "Documents ingested: {} ({} chunks)",
                self.documents_ingested, self.chunks_indexed
            ),
            format!(
                "Decisions: {} ({} approved, {} rejected)",
                self.decisions_evaluated, self.approvals, self.rejections
            ),
            format!(
                "Feedback: {} ({} revisions spawned)",
                self.feedback_recorded, self.revisions_spawned
            ),
        ]
        .join("\n")
    }
}

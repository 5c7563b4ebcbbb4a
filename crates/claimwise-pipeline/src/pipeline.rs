//! The claim pipeline facade
//!
//! Wires chunking, embedding, retrieval, extraction, evaluation, and the
//! audit store into one entry point. Ingestion is serialized per context
//! with a keyed async mutex, so concurrent uploads to the same claim
//! context cannot interleave; different contexts proceed in parallel.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::metrics::PipelineMetrics;
use claimwise_chunker::Chunker;
use claimwise_domain::traits::{DecisionStore, Embedder, QueryExtractor};
use claimwise_domain::{
    AuditPayload, ClaimRequest, ContextId, DecisionId, DecisionOutcome, DecisionResult, Document,
    DocumentId, DocumentRole, FeedbackKind, FeedbackRecord, RetrievalResult, RetrievedChunk,
    StructuredQuery,
};
use claimwise_store::{ContextStore, EffectiveClauses, SqliteDecisionStore, VectorRecord, VectorStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn lock_err<T>(_: T) -> PipelineError {
    PipelineError::Task("lock poisoned".to_string())
}

/// The end-to-end claim pipeline
///
/// Generic over the embedding and extraction capabilities; everything else
/// is fixed wiring. All methods take `&self`, so one pipeline instance can
/// be shared across tasks.
pub struct Pipeline<E, X> {
    embedder: Arc<E>,
    extractor: Arc<X>,
    chunker: Chunker,
    config: PipelineConfig,
    contexts: RwLock<ContextStore>,
    vectors: VectorStore,
    decisions: Mutex<SqliteDecisionStore>,
    metrics: Mutex<PipelineMetrics>,
    ingest_locks: Mutex<HashMap<ContextId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<E, X> Pipeline<E, X>
where
    E: Embedder + Send + Sync + 'static,
    E::Error: std::fmt::Display,
    X: QueryExtractor + Send + Sync + 'static,
    X::Error: std::fmt::Display,
{
    /// Build a pipeline from its capabilities and configuration
    pub fn new(
        embedder: E,
        extractor: X,
        decisions: SqliteDecisionStore,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let vectors = VectorStore::new(embedder.dimension());
        let chunker = Chunker::new(config.chunker.clone());
        Ok(Self {
            embedder: Arc::new(embedder),
            extractor: Arc::new(extractor),
            chunker,
            config,
            contexts: RwLock::new(ContextStore::new()),
            vectors,
            decisions: Mutex::new(decisions),
            metrics: Mutex::new(PipelineMetrics::new()),
            ingest_locks: Mutex::new(HashMap::new()),
        })
    }

    fn ingest_lock(&self, context_id: ContextId) -> Result<Arc<tokio::sync::Mutex<()>>, PipelineError> {
        let mut locks = self.ingest_locks.lock().map_err(lock_err)?;
        // A strong count of 1 means only the map holds the mutex: no ingest
        // is using or waiting on it, so the entry can go. New clones are
        // only taken under this map lock, so the sweep cannot race one.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(Arc::clone(locks.entry(context_id).or_default()))
    }

    /// Ingest a document into a claim context
    ///
    /// Chunks the text, embeds every chunk, indexes the vectors, and
    /// registers the document for precedence resolution. Re-uploading
    /// happens as a fresh document; nothing is edited in place.
    #[instrument(skip(self, text), fields(context = %context_id, role = role.as_str()))]
    pub async fn ingest_document(
        &self,
        context_id: ContextId,
        role: DocumentRole,
        text: &str,
    ) -> Result<DocumentId, PipelineError> {
        let lock = self.ingest_lock(context_id)?;
        let _guard = lock.lock().await;

        let document = Document::new(role, text, now_millis());
        let chunks = self.chunker.chunk(document.id, text)?;

        let embedder = Arc::clone(&self.embedder);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let task = tokio::task::spawn_blocking(move || {
            texts
                .iter()
                .map(|t| embedder.embed(t).map_err(|e| e.to_string()))
                .collect::<Result<Vec<_>, _>>()
        });
        let embeddings = tokio::time::timeout(self.config.embedding_timeout(), task)
            .await
            .map_err(|_| PipelineError::EmbeddingTimeout)?
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(PipelineError::Embedding)?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            self.vectors.ingest(VectorRecord {
                chunk_id: chunk.id,
                document_id: document.id,
                ordinal: chunk.ordinal,
                role,
                embedding,
            })?;
        }

        let chunk_count = chunks.len();
        let document_id = document.id;
        self.contexts
            .write()
            .map_err(lock_err)?
            .add_document(context_id, document, chunks);
        self.metrics.lock().map_err(lock_err)?.record_ingest(chunk_count);

        info!(document = %document_id, chunks = chunk_count, "Ingested document");
        Ok(document_id)
    }

    /// Evaluate a claim request against a context
    ///
    /// Produces and persists a decision with its full reasoning tree. The
    /// evaluation itself is pure; this method stamps identity and time at
    /// the persistence boundary.
    #[instrument(skip(self, request), fields(context = %context_id))]
    pub async fn evaluate(
        &self,
        context_id: ContextId,
        request: &ClaimRequest,
    ) -> Result<DecisionResult, PipelineError> {
        {
            let contexts = self.contexts.read().map_err(lock_err)?;
            if !contexts.context_exists(context_id) {
                return Err(PipelineError::UnknownContext(context_id));
            }
        }

        let query = self.resolve_query(request).await?;
        let retrieval = self.retrieve(context_id, &query).await?;
        let stated_limit = self
            .contexts
            .read()
            .map_err(lock_err)?
            .policy_limit(context_id);

        let evaluation =
            claimwise_engine::evaluate(&query, &retrieval, stated_limit, &self.config.policy);

        let decision = DecisionResult {
            id: DecisionId::new(),
            context_id,
            query,
            evaluation,
            revision: 0,
            supersedes: None,
            created_at: now_millis(),
        };

        self.decisions
            .lock()
            .map_err(lock_err)?
            .insert_decision(&decision)?;
        self.metrics
            .lock()
            .map_err(lock_err)?
            .record_decision(decision.evaluation.outcome);

        info!(
            decision = %decision.id,
            outcome = decision.evaluation.outcome.as_str(),
            confidence = decision.evaluation.confidence,
            "Evaluated claim"
        );
        Ok(decision)
    }

    async fn resolve_query(&self, request: &ClaimRequest) -> Result<StructuredQuery, PipelineError> {
        match request {
            ClaimRequest::Structured(query) => {
                query
                    .validate()
                    .map_err(|e| PipelineError::Extraction(e.to_string()))?;
                Ok(query.clone())
            }
            ClaimRequest::FreeText(text) => {
                let extractor = Arc::clone(&self.extractor);
                let text = text.clone();
                let task = tokio::task::spawn_blocking(move || {
                    extractor.extract(&text).map_err(|e| e.to_string())
                });
                let joined = tokio::time::timeout(self.config.extraction_timeout(), task)
                    .await
                    .map_err(|_| PipelineError::ExtractionTimeout)?
                    .map_err(|e| PipelineError::Task(e.to_string()))?;
                joined.map_err(PipelineError::Extraction)
            }
        }
    }

    async fn retrieve(
        &self,
        context_id: ContextId,
        query: &StructuredQuery,
    ) -> Result<RetrievalResult, PipelineError> {
        let embedder = Arc::clone(&self.embedder);
        let text = query.retrieval_text();
        if text.trim().is_empty() {
            return Ok(RetrievalResult::empty());
        }

        let task =
            tokio::task::spawn_blocking(move || embedder.embed(&text).map_err(|e| e.to_string()));
        let vector = tokio::time::timeout(self.config.embedding_timeout(), task)
            .await
            .map_err(|_| PipelineError::EmbeddingTimeout)?
            .map_err(|e| PipelineError::Task(e.to_string()))?
            .map_err(PipelineError::Embedding)?;

        let document_ids = self
            .contexts
            .read()
            .map_err(lock_err)?
            .document_ids(context_id);
        let scored = self
            .vectors
            .query(&vector, self.config.top_k, Some(&document_ids))?;

        let contexts = self.contexts.read().map_err(lock_err)?;
        let chunks = scored
            .into_iter()
            .filter_map(|hit| {
                contexts
                    .get_chunk(context_id, hit.chunk_id)
                    .cloned()
                    .map(|chunk| RetrievedChunk {
                        chunk,
                        similarity: hit.similarity,
                        role: hit.role,
                    })
            })
            .collect();
        Ok(RetrievalResult { chunks })
    }

    /// Record reviewer feedback on a decision
    ///
    /// The feedback row is always appended. When the corrected outcome
    /// differs from the decision's latest revision, an override revision is
    /// spawned and its id returned; the original decision stays untouched.
    #[instrument(skip(self, comment), fields(decision = %decision_id))]
    pub async fn record_feedback(
        &self,
        decision_id: DecisionId,
        corrected_outcome: DecisionOutcome,
        kind: FeedbackKind,
        comment: &str,
    ) -> Result<Option<DecisionId>, PipelineError> {
        let mut store = self.decisions.lock().map_err(lock_err)?;

        let original = store
            .get_decision(decision_id)?
            .ok_or(PipelineError::DecisionNotFound(decision_id))?;
        let latest = store
            .revisions_of(decision_id)?
            .into_iter()
            .last()
            .unwrap_or(original);

        let now = now_millis();
        store.append_feedback(&FeedbackRecord {
            decision_id,
            corrected_outcome,
            kind,
            comment: comment.to_string(),
            created_at: now,
        })?;

        let spawned = if corrected_outcome != latest.evaluation.outcome {
            let revision = latest.override_with(corrected_outcome, now);
            store.insert_decision(&revision)?;
            info!(revision = %revision.id, "Feedback spawned override revision");
            Some(revision.id)
        } else {
            None
        };
        drop(store);

        self.metrics
            .lock()
            .map_err(lock_err)?
            .record_feedback(spawned.is_some());
        Ok(spawned)
    }

    /// Resolve the effective clause set for a topic under document precedence
    ///
    /// Amendments override base clauses, riders add (or override when they
    /// say so), and correspondence is surfaced as advisory only.
    pub fn effective_clauses(
        &self,
        context_id: ContextId,
        topic: &str,
    ) -> Result<EffectiveClauses, PipelineError> {
        let contexts = self.contexts.read().map_err(lock_err)?;
        if !contexts.context_exists(context_id) {
            return Err(PipelineError::UnknownContext(context_id));
        }
        Ok(contexts.resolve(context_id, topic))
    }

    /// Export a decision's full audit trail
    pub async fn export_audit(
        &self,
        decision_id: DecisionId,
    ) -> Result<AuditPayload, PipelineError> {
        let store = self.decisions.lock().map_err(lock_err)?;
        let decision = store
            .get_decision(decision_id)?
            .ok_or(PipelineError::DecisionNotFound(decision_id))?;
        let revisions = store.revisions_of(decision_id)?;
        let feedback = store.feedback_for(decision_id)?;

        Ok(AuditPayload {
            decision,
            revisions,
            feedback,
            exported_at: now_millis(),
        })
    }

    /// Snapshot of the pipeline counters
    pub fn metrics(&self) -> PipelineMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

//! SQLite-backed decision and audit persistence
//!
//! Decisions and their reasoning trees are written in one transaction, so
//! a crash never leaves a decision without its explanation. Revisions are
//! new rows pointing at what they supersede; nothing is updated in place.

use crate::StoreError;
use claimwise_domain::traits::DecisionStore;
use claimwise_domain::{
    DecisionId, DecisionOutcome, DecisionResult, Evaluation, Factor, FeedbackKind,
    FeedbackRecord, ReasoningStep, RiskFactor,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-based implementation of [`DecisionStore`]
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// `SqliteDecisionStore` instance.
pub struct SqliteDecisionStore {
    conn: Connection,
}

impl SqliteDecisionStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn decision_exists(&self, id: DecisionId) -> Result<bool, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM decisions WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn load_steps(&self, id: DecisionId) -> Result<Vec<ReasoningStep>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT factor, weight, value, passed, detail, supporting_chunks
             FROM reasoning_steps WHERE decision_id = ?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut steps = Vec::new();
        for row in rows {
            let (factor, weight, value, passed, detail, chunks_json) = row?;
            let factor = Factor::parse(&factor)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown factor: {}", factor)))?;
            let supporting_chunks = serde_json::from_str(&chunks_json)
                .map_err(|e| StoreError::InvalidData(format!("Bad chunk list: {}", e)))?;
            steps.push(ReasoningStep {
                factor,
                weight,
                value,
                passed,
                detail,
                supporting_chunks,
            });
        }
        Ok(steps)
    }

    fn row_to_decision(row: &rusqlite::Row<'_>) -> rusqlite::Result<PartialDecisionRow> {
        Ok(PartialDecisionRow {
            id: row.get(0)?,
            context_id: row.get(1)?,
            query_json: row.get(2)?,
            outcome: row.get(3)?,
            coverage_ratio: row.get(4)?,
            confidence: row.get(5)?,
            risk_factors: row.get(6)?,
            revision: row.get(7)?,
            supersedes: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn hydrate(&self, row: PartialDecisionRow) -> Result<DecisionResult, StoreError> {
        let id = DecisionId::from_string(&row.id).map_err(StoreError::InvalidData)?;
        let context_id =
            claimwise_domain::ContextId::from_string(&row.context_id).map_err(StoreError::InvalidData)?;
        let supersedes = row
            .supersedes
            .map(|s| DecisionId::from_string(&s).map_err(StoreError::InvalidData))
            .transpose()?;
        let outcome = DecisionOutcome::parse(&row.outcome)
            .ok_or_else(|| StoreError::InvalidData(format!("Unknown outcome: {}", row.outcome)))?;
        let query = serde_json::from_str(&row.query_json)
            .map_err(|e| StoreError::InvalidData(format!("Bad query: {}", e)))?;
        let risk_names: Vec<String> = serde_json::from_str(&row.risk_factors)
            .map_err(|e| StoreError::InvalidData(format!("Bad risk factors: {}", e)))?;
        let risk_factors = risk_names
            .iter()
            .map(|name| {
                RiskFactor::parse(name)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown risk factor: {}", name)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let steps = self.load_steps(id)?;

        Ok(DecisionResult {
            id,
            context_id,
            query,
            evaluation: Evaluation {
                outcome,
                coverage_ratio: row.coverage_ratio,
                confidence: row.confidence,
                risk_factors,
                steps,
            },
            revision: row.revision,
            supersedes,
            created_at: row.created_at as u64,
        })
    }
}

struct PartialDecisionRow {
    id: String,
    context_id: String,
    query_json: String,
    outcome: String,
    coverage_ratio: f64,
    confidence: f64,
    risk_factors: String,
    revision: u32,
    supersedes: Option<String>,
    created_at: i64,
}

const DECISION_COLUMNS: &str = "id, context_id, query_json, outcome, coverage_ratio, confidence, \
     risk_factors, revision, supersedes, created_at";

impl DecisionStore for SqliteDecisionStore {
    type Error = StoreError;

    fn insert_decision(&mut self, decision: &DecisionResult) -> Result<(), Self::Error> {
        let query_json = serde_json::to_string(&decision.query)
            .map_err(|e| StoreError::InvalidData(format!("Unserializable query: {}", e)))?;
        let risk_factors: Vec<&str> = decision
            .evaluation
            .risk_factors
            .iter()
            .map(|r| r.as_str())
            .collect();
        let risk_json = serde_json::to_string(&risk_factors)
            .map_err(|e| StoreError::InvalidData(format!("Unserializable risk factors: {}", e)))?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO decisions (id, context_id, query_json, outcome, coverage_ratio, \
             confidence, risk_factors, revision, supersedes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                decision.id.to_string(),
                decision.context_id.to_string(),
                query_json,
                decision.evaluation.outcome.as_str(),
                decision.evaluation.coverage_ratio,
                decision.evaluation.confidence,
                risk_json,
                decision.revision,
                decision.supersedes.map(|s| s.to_string()),
                decision.created_at as i64,
            ],
        )?;

        for (seq, step) in decision.evaluation.steps.iter().enumerate() {
            let chunks_json = serde_json::to_string(&step.supporting_chunks)
                .map_err(|e| StoreError::InvalidData(format!("Unserializable chunks: {}", e)))?;
            tx.execute(
                "INSERT INTO reasoning_steps (decision_id, seq, factor, weight, value, passed, \
                 detail, supporting_chunks)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    decision.id.to_string(),
                    seq as i64,
                    step.factor.as_str(),
                    step.weight,
                    step.value,
                    step.passed,
                    step.detail,
                    chunks_json,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_decision(&self, id: DecisionId) -> Result<Option<DecisionResult>, Self::Error> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM decisions WHERE id = ?1", DECISION_COLUMNS),
                params![id.to_string()],
                Self::row_to_decision,
            )
            .optional()?;

        row.map(|r| self.hydrate(r)).transpose()
    }

    fn revisions_of(&self, id: DecisionId) -> Result<Vec<DecisionResult>, Self::Error> {
        let mut revisions = Vec::new();
        let mut current = id;

        // Supersession is a chain: each revision points at exactly one
        // predecessor, so following forward links walks it oldest first.
        loop {
            let next = self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM decisions WHERE supersedes = ?1",
                        DECISION_COLUMNS
                    ),
                    params![current.to_string()],
                    Self::row_to_decision,
                )
                .optional()?;

            match next {
                Some(row) => {
                    let decision = self.hydrate(row)?;
                    current = decision.id;
                    revisions.push(decision);
                }
                None => break,
            }
        }
        Ok(revisions)
    }

    fn append_feedback(&mut self, record: &FeedbackRecord) -> Result<(), Self::Error> {
        if !self.decision_exists(record.decision_id)? {
            return Err(StoreError::NotFound(record.decision_id.to_string()));
        }

        self.conn.execute(
            "INSERT INTO feedback (decision_id, corrected_outcome, kind, comment, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.decision_id.to_string(),
                record.corrected_outcome.as_str(),
                record.kind.as_str(),
                record.comment,
                record.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn feedback_for(&self, id: DecisionId) -> Result<Vec<FeedbackRecord>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT decision_id, corrected_outcome, kind, comment, created_at
             FROM feedback WHERE decision_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (decision_id, outcome, kind, comment, created_at) = row?;
            records.push(FeedbackRecord {
                decision_id: DecisionId::from_string(&decision_id)
                    .map_err(StoreError::InvalidData)?,
                corrected_outcome: DecisionOutcome::parse(&outcome).ok_or_else(|| {
                    StoreError::InvalidData(format!("Unknown outcome: {}", outcome))
                })?,
                kind: FeedbackKind::parse(&kind)
                    .ok_or_else(|| StoreError::InvalidData(format!("Unknown kind: {}", kind)))?,
                comment,
                created_at: created_at as u64,
            });
        }
        Ok(records)
    }
}

//! Claim contexts and role-precedence clause resolution
//!
//! A claim context is the document set one claim is evaluated against: the
//! base policy plus riders, amendments, and correspondence. This store
//! groups documents and chunks by context and answers precedence questions;
//! it does no similarity math (that is the vector store's job).

use claimwise_domain::{Chunk, ChunkId, ContextId, Document, DocumentId, DocumentRole};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Override language a rider must state to beat base-policy clauses
const OVERRIDE_MARKERS: [&str; 3] = ["override", "supersede", "notwithstanding"];

/// One clause surviving precedence resolution
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveClause {
    /// Chunk carrying the clause text
    pub chunk_id: ChunkId,

    /// Owning document
    pub document_id: DocumentId,

    /// Role the clause derives its authority from
    pub role: DocumentRole,

    /// Advisory clauses (correspondence) inform but never bind
    pub advisory: bool,

    /// Clause text
    pub text: String,

    /// Upload timestamp of the owning document
    pub uploaded_at: u64,
}

/// The effective clause set for one topic after precedence resolution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveClauses {
    /// Topic the resolution was run for
    pub topic: String,

    /// Surviving clauses, highest precedence first
    pub clauses: Vec<EffectiveClause>,
}

impl EffectiveClauses {
    /// Binding (non-advisory) clauses only
    pub fn binding(&self) -> impl Iterator<Item = &EffectiveClause> {
        self.clauses.iter().filter(|c| !c.advisory)
    }

    /// Whether resolution found nothing at all
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[derive(Default)]
struct ContextEntry {
    documents: HashMap<DocumentId, Document>,
    chunks: HashMap<ChunkId, Chunk>,
}

/// Documents and chunks grouped by claim context
#[derive(Default)]
pub struct ContextStore {
    contexts: HashMap<ContextId, ContextEntry>,
}

impl ContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and its chunks under a context
    pub fn add_document(&mut self, context_id: ContextId, document: Document, chunks: Vec<Chunk>) {
        let entry = self.contexts.entry(context_id).or_default();
        for chunk in chunks {
            entry.chunks.insert(chunk.id, chunk);
        }
        entry.documents.insert(document.id, document);
    }

    /// Document ids belonging to a context; the vector-store filter
    pub fn document_ids(&self, context_id: ContextId) -> Vec<DocumentId> {
        self.contexts
            .get(&context_id)
            .map(|e| e.documents.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Look up a document
    pub fn get_document(
        &self,
        context_id: ContextId,
        document_id: DocumentId,
    ) -> Option<&Document> {
        self.contexts
            .get(&context_id)?
            .documents
            .get(&document_id)
    }

    /// Look up a chunk by id within a context
    pub fn get_chunk(&self, context_id: ContextId, chunk_id: ChunkId) -> Option<&Chunk> {
        self.contexts.get(&context_id)?.chunks.get(&chunk_id)
    }

    /// Whether the context holds any documents
    pub fn context_exists(&self, context_id: ContextId) -> bool {
        self.contexts
            .get(&context_id)
            .map(|e| !e.documents.is_empty())
            .unwrap_or(false)
    }

    /// Resolve the effective clause set for a topic
    ///
    /// Deterministic precedence over chunks mentioning the topic
    /// (case-insensitive):
    ///
    /// - amendments override base-policy clauses on the topic; when several
    ///   amendments mention it, only the most recently uploaded amendment
    ///   survives
    /// - riders add clauses; a rider only displaces base clauses when its
    ///   text states an override
    /// - correspondence is kept, flagged advisory, and never displaces
    ///   anything
    ///
    /// The result is ordered by precedence rank descending, then recency,
    /// then chunk ordinal.
    pub fn resolve(&self, context_id: ContextId, topic: &str) -> EffectiveClauses {
        let Some(entry) = self.contexts.get(&context_id) else {
            return EffectiveClauses {
                topic: topic.to_string(),
                clauses: Vec::new(),
            };
        };

        let needle = topic.to_lowercase();
        let mut matches: Vec<(&Document, &Chunk)> = entry
            .chunks
            .values()
            .filter(|chunk| chunk.text.to_lowercase().contains(&needle))
            .filter_map(|chunk| {
                entry
                    .documents
                    .get(&chunk.document_id)
                    .map(|doc| (doc, chunk))
            })
            .collect();

        // Deterministic processing order regardless of map iteration
        matches.sort_by(|(doc_a, chunk_a), (doc_b, chunk_b)| {
            (doc_b.role.precedence_rank(), doc_b.uploaded_at)
                .cmp(&(doc_a.role.precedence_rank(), doc_a.uploaded_at))
                .then(doc_a.id.cmp(&doc_b.id))
                .then(chunk_a.ordinal.cmp(&chunk_b.ordinal))
        });

        let newest_amendment: Option<DocumentId> = matches
            .iter()
            .filter(|(doc, _)| doc.role == DocumentRole::Amendment)
            .max_by_key(|(doc, _)| (doc.uploaded_at, doc.id))
            .map(|(doc, _)| doc.id);

        let rider_overrides = matches.iter().any(|(doc, chunk)| {
            doc.role == DocumentRole::Rider && states_override(&chunk.text)
        });

        let base_superseded = newest_amendment.is_some() || rider_overrides;

        let clauses = matches
            .into_iter()
            .filter(|(doc, _)| match doc.role {
                // Only the newest amendment speaks for its role
                DocumentRole::Amendment => Some(doc.id) == newest_amendment,
                DocumentRole::Rider => true,
                DocumentRole::BasePolicy => !base_superseded,
                DocumentRole::Correspondence => true,
            })
            .map(|(doc, chunk)| EffectiveClause {
                chunk_id: chunk.id,
                document_id: doc.id,
                role: doc.role,
                advisory: !doc.role.is_authoritative(),
                text: chunk.text.clone(),
                uploaded_at: doc.uploaded_at,
            })
            .collect();

        EffectiveClauses {
            topic: topic.to_string(),
            clauses,
        }
    }

    /// The absolute claim limit stated in the context's binding clauses
    ///
    /// Scans authoritative chunks in precedence order for "sum insured" /
    /// "policy limit" style amounts; the highest-precedence, most recent
    /// statement wins. `None` when no clause states a limit.
    pub fn policy_limit(&self, context_id: ContextId) -> Option<u64> {
        let entry = self.contexts.get(&context_id)?;

        let mut documents: Vec<&Document> = entry
            .documents
            .values()
            .filter(|doc| doc.role.is_authoritative())
            .collect();
        documents.sort_by(|a, b| {
            (b.role.precedence_rank(), b.uploaded_at, b.id)
                .cmp(&(a.role.precedence_rank(), a.uploaded_at, a.id))
        });

        for doc in documents {
            let mut chunks: Vec<&Chunk> = entry
                .chunks
                .values()
                .filter(|c| c.document_id == doc.id)
                .collect();
            chunks.sort_by_key(|c| c.ordinal);
            for chunk in chunks {
                if let Some(limit) = parse_stated_limit(&chunk.text) {
                    return Some(limit);
                }
            }
        }
        None
    }
}

fn states_override(text: &str) -> bool {
    let lowered = text.to_lowercase();
    OVERRIDE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Parse an amount out of limit-stating clause text
///
/// Handles "sum insured of Rs. 5,00,000", "policy limit: ₹500000",
/// "maximum coverage of INR 5,00,000" and similar phrasings.
pub fn parse_stated_limit(text: &str) -> Option<u64> {
    static LIMIT_RE: OnceLock<Regex> = OnceLock::new();
    let re = LIMIT_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:sum insured|policy limit|coverage limit|maximum coverage|covered up to|up to a maximum)\D{0,20}?([\d][\d,]*)",
        )
        .unwrap_or_else(|e| panic!("invalid limit regex: {}", e))
    });

    let captures = re.captures(text)?;
    let digits: String = captures.get(1)?.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimwise_domain::ChunkId;

    fn doc_with_chunk(role: DocumentRole, text: &str, uploaded_at: u64) -> (Document, Vec<Chunk>) {
        let document = Document::new(role, text, uploaded_at);
        let chunk = Chunk {
            id: ChunkId::new(),
            document_id: document.id,
            ordinal: 0,
            text: text.to_string(),
            start: 0,
            overlap: 0,
        };
        (document, vec![chunk])
    }

    #[test]
    fn test_amendment_beats_base_policy() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "Cataract surgery requires a 24 month waiting period.",
            100,
        );
        store.add_document(context, base, chunks);
        let (amendment, chunks) = doc_with_chunk(
            DocumentRole::Amendment,
            "Cataract surgery waiting period is reduced to 12 months.",
            200,
        );
        let amendment_id = amendment.id;
        store.add_document(context, amendment, chunks);

        let resolved = store.resolve(context, "cataract");
        assert_eq!(resolved.clauses.len(), 1);
        assert_eq!(resolved.clauses[0].document_id, amendment_id);
        assert_eq!(resolved.clauses[0].role, DocumentRole::Amendment);
    }

    #[test]
    fn test_newest_amendment_wins_within_role() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (older, chunks) = doc_with_chunk(
            DocumentRole::Amendment,
            "Dental coverage is capped at 20,000.",
            100,
        );
        store.add_document(context, older, chunks);
        let (newer, chunks) = doc_with_chunk(
            DocumentRole::Amendment,
            "Dental coverage is capped at 30,000.",
            200,
        );
        let newer_id = newer.id;
        store.add_document(context, newer, chunks);

        let resolved = store.resolve(context, "dental");
        assert_eq!(resolved.clauses.len(), 1);
        assert_eq!(resolved.clauses[0].document_id, newer_id);
    }

    #[test]
    fn test_rider_adds_without_displacing_base() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "Maternity expenses are covered after 9 months.",
            100,
        );
        store.add_document(context, base, chunks);
        let (rider, chunks) = doc_with_chunk(
            DocumentRole::Rider,
            "Maternity rider: newborn cover included from day one.",
            200,
        );
        store.add_document(context, rider, chunks);

        let resolved = store.resolve(context, "maternity");
        assert_eq!(resolved.clauses.len(), 2);
        // Rider ranks above base
        assert_eq!(resolved.clauses[0].role, DocumentRole::Rider);
        assert_eq!(resolved.clauses[1].role, DocumentRole::BasePolicy);
    }

    #[test]
    fn test_overriding_rider_displaces_base() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "Ambulance charges are excluded.",
            100,
        );
        store.add_document(context, base, chunks);
        let (rider, chunks) = doc_with_chunk(
            DocumentRole::Rider,
            "This rider overrides the exclusion: ambulance charges are covered.",
            200,
        );
        store.add_document(context, rider, chunks);

        let resolved = store.resolve(context, "ambulance");
        assert_eq!(resolved.clauses.len(), 1);
        assert_eq!(resolved.clauses[0].role, DocumentRole::Rider);
    }

    #[test]
    fn test_correspondence_is_advisory_only() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "Hernia repair is covered after 12 months.",
            100,
        );
        store.add_document(context, base, chunks);
        let (email, chunks) = doc_with_chunk(
            DocumentRole::Correspondence,
            "Per our call, hernia repair should be fine to claim.",
            300,
        );
        store.add_document(context, email, chunks);

        let resolved = store.resolve(context, "hernia");
        assert_eq!(resolved.clauses.len(), 2);
        let advisory: Vec<bool> = resolved.clauses.iter().map(|c| c.advisory).collect();
        assert_eq!(advisory, vec![false, true]);
        assert_eq!(resolved.binding().count(), 1);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        for (role, text, at) in [
            (DocumentRole::BasePolicy, "Knee replacement covered.", 100),
            (DocumentRole::Rider, "Knee physiotherapy rider added.", 150),
            (DocumentRole::Amendment, "Knee replacement copay waived.", 200),
        ] {
            let (doc, chunks) = doc_with_chunk(role, text, at);
            store.add_document(context, doc, chunks);
        }

        let first = store.resolve(context, "knee");
        for _ in 0..5 {
            assert_eq!(store.resolve(context, "knee"), first);
        }
    }

    #[test]
    fn test_unknown_topic_resolves_empty() {
        let store = ContextStore::new();
        let resolved = store.resolve(ContextId::new(), "anything");
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_policy_limit_parsed_from_clauses() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "The sum insured of Rs. 5,00,000 applies per policy year.",
            100,
        );
        store.add_document(context, base, chunks);

        assert_eq!(store.policy_limit(context), Some(500_000));
    }

    #[test]
    fn test_policy_limit_prefers_amendment() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (base, chunks) = doc_with_chunk(
            DocumentRole::BasePolicy,
            "Sum insured: 5,00,000.",
            100,
        );
        store.add_document(context, base, chunks);
        let (amendment, chunks) = doc_with_chunk(
            DocumentRole::Amendment,
            "The sum insured is increased to 10,00,000.",
            200,
        );
        store.add_document(context, amendment, chunks);

        assert_eq!(store.policy_limit(context), Some(1_000_000));
    }

    #[test]
    fn test_policy_limit_ignores_correspondence() {
        let mut store = ContextStore::new();
        let context = ContextId::new();
        let (email, chunks) = doc_with_chunk(
            DocumentRole::Correspondence,
            "I believe the sum insured of 99,00,000 applies here.",
            100,
        );
        store.add_document(context, email, chunks);

        assert_eq!(store.policy_limit(context), None);
    }

    #[test]
    fn test_parse_stated_limit_formats() {
        assert_eq!(
            parse_stated_limit("policy limit: \u{20b9}500000"),
            Some(500_000)
        );
        assert_eq!(
            parse_stated_limit("covered up to INR 2,50,000 per year"),
            Some(250_000)
        );
        assert_eq!(parse_stated_limit("no amounts here"), None);
    }
}

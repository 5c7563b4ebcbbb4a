//! In-memory vector store with exact cosine-similarity search
//!
//! Retrieval must be order-stable: repeated queries with the same vector
//! and filter return the same ranked list, with ties broken by earliest
//! chunk ordinal. An exact scan gives that determinism directly, so no
//! approximate index is used.
//!
//! Vectors are namespaced per document; ingest is atomic per chunk under a
//! write lock, so a concurrent query never observes a partially written
//! record.

use crate::embedding::cosine_similarity;
use crate::StoreError;
use claimwise_domain::{ChunkId, DocumentId, DocumentRole};
use std::collections::HashMap;
use std::sync::RwLock;

/// A chunk vector registered with the store
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Chunk the vector belongs to
    pub chunk_id: ChunkId,

    /// Owning document (the namespace)
    pub document_id: DocumentId,

    /// Chunk ordinal within the document; the retrieval tie-break
    pub ordinal: usize,

    /// Role of the owning document
    pub role: DocumentRole,

    /// The embedding vector
    pub embedding: Vec<f32>,
}

/// One scored retrieval hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Retrieved chunk
    pub chunk_id: ChunkId,

    /// Owning document
    pub document_id: DocumentId,

    /// Chunk ordinal within the document
    pub ordinal: usize,

    /// Role of the owning document
    pub role: DocumentRole,

    /// Cosine similarity against the query vector
    pub similarity: f32,
}

/// In-memory, exact-scan vector store
pub struct VectorStore {
    dimension: usize,
    namespaces: RwLock<HashMap<DocumentId, Vec<VectorRecord>>>,
}

impl VectorStore {
    /// Create a store expecting vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Expected embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Register a chunk vector under its document's namespace
    ///
    /// Re-ingesting a chunk id replaces the prior vector, which supports
    /// re-embedding after amendment. The write is atomic per chunk.
    pub fn ingest(&self, record: VectorRecord) -> Result<(), StoreError> {
        if record.embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: record.embedding.len(),
            });
        }

        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| StoreError::InvalidData(format!("Lock poisoned: {}", e)))?;
        let namespace = namespaces.entry(record.document_id).or_default();

        match namespace.iter_mut().find(|r| r.chunk_id == record.chunk_id) {
            Some(existing) => *existing = record,
            None => namespace.push(record),
        }

        Ok(())
    }

    /// Return the k nearest chunks under cosine similarity
    ///
    /// `filter` restricts the search to the given documents; `None` searches
    /// every namespace. An empty or filtered-to-empty store returns an empty
    /// result, not an error. Ranking is by similarity descending, ties by
    /// earliest ordinal, then document id.
    pub fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&[DocumentId]>,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| StoreError::InvalidData(format!("Lock poisoned: {}", e)))?;

        let mut hits: Vec<ScoredChunk> = namespaces
            .iter()
            .filter(|(doc_id, _)| match filter {
                Some(ids) => ids.contains(doc_id),
                None => true,
            })
            .flat_map(|(_, records)| records.iter())
            .map(|record| ScoredChunk {
                chunk_id: record.chunk_id,
                document_id: record.document_id,
                ordinal: record.ordinal,
                role: record.role,
                similarity: cosine_similarity(vector, &record.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.ordinal.cmp(&b.ordinal))
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Drop every vector belonging to the given document
    pub fn remove_document(&self, document_id: DocumentId) -> Result<(), StoreError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| StoreError::InvalidData(format!("Lock poisoned: {}", e)))?;
        namespaces.remove(&document_id);
        Ok(())
    }

    /// Number of vectors across all namespaces
    pub fn len(&self) -> usize {
        self.namespaces
            .read()
            .map(|n| n.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Whether the store holds no vectors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        document_id: DocumentId,
        ordinal: usize,
        embedding: Vec<f32>,
    ) -> VectorRecord {
        VectorRecord {
            chunk_id: ChunkId::new(),
            document_id,
            ordinal,
            role: DocumentRole::BasePolicy,
            embedding,
        }
    }

    #[test]
    fn test_query_empty_store_returns_empty() {
        let store = VectorStore::new(3);
        let hits = store.query(&[1.0, 0.0, 0.0], 5, None).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_nearest_neighbor_ranking() {
        let store = VectorStore::new(3);
        let doc = DocumentId::new();
        let exact = record(doc, 0, vec![1.0, 0.0, 0.0]);
        let exact_id = exact.chunk_id;
        store.ingest(exact).unwrap();
        store.ingest(record(doc, 1, vec![0.7071, 0.7071, 0.0])).unwrap();
        store.ingest(record(doc, 2, vec![0.0, 1.0, 0.0])).unwrap();

        let hits = store.query(&[1.0, 0.0, 0.0], 3, None).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk_id, exact_id);
        assert!(hits[0].similarity > 0.99);
        assert!(hits[1].similarity > 0.5);
        assert!(hits[2].similarity < 0.1);
    }

    #[test]
    fn test_ties_broken_by_earliest_ordinal() {
        let store = VectorStore::new(2);
        let doc = DocumentId::new();
        // Identical vectors at different ordinals, ingested out of order
        store.ingest(record(doc, 5, vec![1.0, 0.0])).unwrap();
        store.ingest(record(doc, 1, vec![1.0, 0.0])).unwrap();
        store.ingest(record(doc, 3, vec![1.0, 0.0])).unwrap();

        let hits = store.query(&[1.0, 0.0], 3, None).unwrap();
        let ordinals: Vec<usize> = hits.iter().map(|h| h.ordinal).collect();
        assert_eq!(ordinals, vec![1, 3, 5]);
    }

    #[test]
    fn test_query_is_order_stable() {
        let store = VectorStore::new(4);
        let doc = DocumentId::new();
        for i in 0..10 {
            let mut v = vec![0.1, 0.2, 0.3, 0.4];
            v[i % 4] += i as f32 * 0.05;
            store.ingest(record(doc, i, v)).unwrap();
        }

        let first = store.query(&[0.3, 0.1, 0.4, 0.2], 5, None).unwrap();
        for _ in 0..5 {
            let again = store.query(&[0.3, 0.1, 0.4, 0.2], 5, None).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_document_filter_restricts_results() {
        let store = VectorStore::new(2);
        let doc_a = DocumentId::new();
        let doc_b = DocumentId::new();
        store.ingest(record(doc_a, 0, vec![1.0, 0.0])).unwrap();
        store.ingest(record(doc_b, 0, vec![1.0, 0.0])).unwrap();

        let hits = store.query(&[1.0, 0.0], 10, Some(&[doc_a])).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, doc_a);

        // Filtered to nothing is an empty result, not an error
        let hits = store.query(&[1.0, 0.0], 10, Some(&[])).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_reingest_replaces_vector() {
        let store = VectorStore::new(2);
        let doc = DocumentId::new();
        let chunk_id = ChunkId::new();
        store
            .ingest(VectorRecord {
                chunk_id,
                document_id: doc,
                ordinal: 0,
                role: DocumentRole::BasePolicy,
                embedding: vec![0.0, 1.0],
            })
            .unwrap();
        store
            .ingest(VectorRecord {
                chunk_id,
                document_id: doc,
                ordinal: 0,
                role: DocumentRole::BasePolicy,
                embedding: vec![1.0, 0.0],
            })
            .unwrap();

        assert_eq!(store.len(), 1);
        let hits = store.query(&[1.0, 0.0], 1, None).unwrap();
        assert!(hits[0].similarity > 0.99);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let store = VectorStore::new(3);
        let result = store.ingest(record(DocumentId::new(), 0, vec![1.0, 0.0]));
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch { expected: 3, actual: 2 })
        ));

        let result = store.query(&[1.0], 5, None);
        assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
    }
}

//! Identifier newtypes for documents, chunks, contexts, and decisions
//!
//! All identifiers are UUIDv7-based, which provides:
//! - Chronological sortability for temporal queries
//! - 128-bit uniqueness
//! - RFC 9562-standard format with broad ecosystem support
//! - No coordination required for distributed generation

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Parse an identifier from its string form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| format!("Invalid {} string: {}", stringify!($name), e))
            }

            /// Get the timestamp component (milliseconds since Unix epoch)
            pub fn timestamp(&self) -> u64 {
                // UUIDv7: top 48 bits are the Unix millisecond timestamp
                (self.0.as_u128() >> 80) as u64
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an ingested document
    DocumentId
}

uuid_id! {
    /// Unique identifier for a chunk within a document
    ChunkId
}

uuid_id! {
    /// Unique identifier for a claim context (the document set one claim
    /// is evaluated against)
    ContextId
}

uuid_id! {
    /// Unique identifier for a decision result
    DecisionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_chronological() {
        // UUIDv7s generated in sequence should be chronologically ordered
        let id1 = DecisionId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = DecisionId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_id_display_and_parse() {
        let id = DocumentId::new();
        let id_str = id.to_string();

        // UUIDv7 strings are 36 characters (8-4-4-4-12 with hyphens)
        assert_eq!(id_str.len(), 36);

        let parsed = DocumentId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_invalid_string() {
        assert!(ChunkId::from_string("not-a-valid-uuid").is_err());
        assert!(ChunkId::from_string("").is_err());
    }

    #[test]
    fn test_id_serde_roundtrip() {
        let id = ContextId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: ContextId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

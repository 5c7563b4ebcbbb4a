//! Feedback records - append-only human corrections

use crate::decision::DecisionOutcome;
use crate::ids::DecisionId;
use serde::{Deserialize, Serialize};

/// Kind of feedback attached to a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// The decision outcome was wrong and is being corrected
    Correction,
    /// The decision stands but the reasoning could be better
    Improvement,
    /// Something misbehaved
    BugReport,
}

impl FeedbackKind {
    /// Kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Correction => "correction",
            FeedbackKind::Improvement => "improvement",
            FeedbackKind::BugReport => "bug_report",
        }
    }

    /// Parse a kind from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "correction" => Some(FeedbackKind::Correction),
            "improvement" => Some(FeedbackKind::Improvement),
            "bug_report" => Some(FeedbackKind::BugReport),
            _ => None,
        }
    }
}

/// One appended feedback record
///
/// Records never mutate the decision they reference; a correction spawns a
/// new decision revision instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// The decision this feedback refers to
    pub decision_id: DecisionId,

    /// The outcome the reviewer says is correct
    pub corrected_outcome: DecisionOutcome,

    /// Kind of feedback
    pub kind: FeedbackKind,

    /// Free-text reviewer comment
    pub comment: String,

    /// Timestamp (milliseconds since Unix epoch)
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in [
            FeedbackKind::Correction,
            FeedbackKind::Improvement,
            FeedbackKind::BugReport,
        ] {
            assert_eq!(FeedbackKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FeedbackKind::parse("praise"), None);
    }
}

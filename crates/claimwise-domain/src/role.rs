//! Document roles and the precedence order between them

use serde::{Deserialize, Serialize};

/// Role of a document within a claim context
///
/// Roles form a total precedence order used when clauses on the same topic
/// overlap:
///
/// `Amendment > Rider > BasePolicy > Correspondence`
///
/// Correspondence is advisory only and never overrides formal clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    /// The base policy document
    BasePolicy,

    /// A rider adding coverage on top of the base policy
    Rider,

    /// An amendment overriding earlier clauses on the same topic
    Amendment,

    /// Emails and letters; advisory context, never authoritative
    Correspondence,
}

impl DocumentRole {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::BasePolicy => "base_policy",
            DocumentRole::Rider => "rider",
            DocumentRole::Amendment => "amendment",
            DocumentRole::Correspondence => "correspondence",
        }
    }

    /// Parse a role from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "base_policy" => Some(DocumentRole::BasePolicy),
            "rider" => Some(DocumentRole::Rider),
            "amendment" => Some(DocumentRole::Amendment),
            "correspondence" | "email" => Some(DocumentRole::Correspondence),
            _ => None,
        }
    }

    /// Precedence rank; a higher rank wins on topic overlap
    pub fn precedence_rank(&self) -> u8 {
        match self {
            DocumentRole::Amendment => 3,
            DocumentRole::Rider => 2,
            DocumentRole::BasePolicy => 1,
            DocumentRole::Correspondence => 0,
        }
    }

    /// Whether this role can carry authoritative clauses at all
    pub fn is_authoritative(&self) -> bool {
        !matches!(self, DocumentRole::Correspondence)
    }

    /// Whether a clause in this role overrides a clause in `other` on the
    /// same topic
    pub fn overrides(&self, other: DocumentRole) -> bool {
        self.is_authoritative() && self.precedence_rank() > other.precedence_rank()
    }
}

impl std::str::FromStr for DocumentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid document role: {}", s))
    }
}

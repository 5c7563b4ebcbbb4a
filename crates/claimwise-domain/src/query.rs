//! Structured claim queries and their validation

use crate::procedure::Procedure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cities with network hospitals
///
/// Shared by the extraction vocabulary and the default decision policy so
/// the two cannot drift apart.
pub const NETWORK_CITIES: [&str; 7] = [
    "Pune",
    "Mumbai",
    "Delhi",
    "Bangalore",
    "Chennai",
    "Hyderabad",
    "Kolkata",
];

/// Claimant gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other / not disclosed
    Other,
}

impl Gender {
    /// Parse a gender from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Errors raised by structured-query validation
///
/// Validation failures are surfaced to the caller and never retried; a
/// malformed field is a caller bug, not a transient condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Age outside the accepted 0-120 range
    #[error("Age {0} out of range (0-120)")]
    AgeOutOfRange(u32),

    /// Claim amount must be positive when present
    #[error("Claim amount must be greater than zero")]
    NonPositiveAmount,

    /// Procedure name was present but empty
    #[error("Procedure name is empty")]
    EmptyProcedure,

    /// Location was present but empty
    #[error("Location is empty")]
    EmptyLocation,
}

/// The normalized claim description the evaluator consumes
///
/// Every field is optional: anything the parser could not extract with
/// confidence stays unset and contributes zero to the confidence score.
/// Validation only rejects values that are present but malformed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Claimant age in years (0-120)
    pub age: Option<u32>,

    /// Claimant gender
    pub gender: Option<Gender>,

    /// Claimed procedure, normalized into the taxonomy where possible
    pub procedure: Option<Procedure>,

    /// Treatment city
    pub location: Option<String>,

    /// Months the policy has been active
    pub policy_duration_months: Option<u32>,

    /// Claimed amount in the policy currency
    pub claim_amount: Option<u64>,
}

impl StructuredQuery {
    /// Validate all present fields; unset fields are legal
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(age) = self.age {
            if age > 120 {
                return Err(ValidationError::AgeOutOfRange(age));
            }
        }
        if let Some(amount) = self.claim_amount {
            if amount == 0 {
                return Err(ValidationError::NonPositiveAmount);
            }
        }
        if let Some(procedure) = &self.procedure {
            if procedure.name.trim().is_empty() {
                return Err(ValidationError::EmptyProcedure);
            }
        }
        if let Some(location) = &self.location {
            if location.trim().is_empty() {
                return Err(ValidationError::EmptyLocation);
            }
        }
        Ok(())
    }

    /// Merge fields from `other` into unset fields of `self`
    ///
    /// Used to layer LLM-extracted fields under regex-extracted ones; an
    /// already-set field is never overwritten.
    pub fn merge_missing(&mut self, other: StructuredQuery) {
        if self.age.is_none() {
            self.age = other.age;
        }
        if self.gender.is_none() {
            self.gender = other.gender;
        }
        if self.procedure.is_none() {
            self.procedure = other.procedure;
        }
        if self.location.is_none() {
            self.location = other.location;
        }
        if self.policy_duration_months.is_none() {
            self.policy_duration_months = other.policy_duration_months;
        }
        if self.claim_amount.is_none() {
            self.claim_amount = other.claim_amount;
        }
    }

    /// Whether every field the parser tries to extract is set
    pub fn is_complete(&self) -> bool {
        self.age.is_some()
            && self.gender.is_some()
            && self.procedure.is_some()
            && self.location.is_some()
            && self.policy_duration_months.is_some()
    }

    /// A short text rendering of the query, used for retrieval embedding
    pub fn retrieval_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(procedure) = &self.procedure {
            parts.push(procedure.name.clone());
        }
        if let Some(location) = &self.location {
            parts.push(location.clone());
        }
        if let Some(age) = self.age {
            parts.push(format!("age {}", age));
        }
        if let Some(months) = self.policy_duration_months {
            parts.push(format!("policy {} months", months));
        }
        parts.join(" ")
    }
}

/// A claim evaluation request as presented at the parser boundary
///
/// The transport layer hands over either an already-structured query or
/// raw claim text; the distinction is resolved exactly once, here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimRequest {
    /// A pre-structured query; validated, then passed through
    Structured(StructuredQuery),

    /// Free-text claim description needing extraction
    FreeText(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_empty_query() {
        assert!(StructuredQuery::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_age() {
        let query = StructuredQuery {
            age: Some(140),
            ..Default::default()
        };
        assert_eq!(query.validate(), Err(ValidationError::AgeOutOfRange(140)));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let query = StructuredQuery {
            claim_amount: Some(0),
            ..Default::default()
        };
        assert_eq!(query.validate(), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut base = StructuredQuery {
            age: Some(35),
            ..Default::default()
        };
        let filler = StructuredQuery {
            age: Some(99),
            location: Some("Mumbai".to_string()),
            ..Default::default()
        };
        base.merge_missing(filler);
        assert_eq!(base.age, Some(35));
        assert_eq!(base.location.as_deref(), Some("Mumbai"));
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Male"), Some(Gender::Male));
        assert_eq!(Gender::parse("f"), Some(Gender::Female));
        assert_eq!(Gender::parse("unknown"), None);
    }
}

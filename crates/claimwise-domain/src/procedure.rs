//! Procedure taxonomy - normalizing free-text procedure names

use serde::{Deserialize, Serialize};

/// Closed taxonomy of procedure categories
///
/// Categories carry the coverage-relevant attributes: complexity (major
/// surgery classes trigger the minor-claimant hard rejection) and the
/// clause-typical waiting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureCategory {
    /// Dental treatment and oral surgery
    Dental,

    /// Eye procedures (cataract, lens replacement, refractive)
    Ophthalmic,

    /// Heart procedures (bypass, angioplasty)
    Cardiac,

    /// Joint replacement and related surgery
    Orthopedic,

    /// Cosmetic and aesthetic surgery
    Cosmetic,

    /// Maternity and delivery
    Maternity,

    /// Planned general surgery (appendectomy, hernia, gall bladder)
    GeneralSurgery,

    /// Emergency and accident treatment
    Emergency,
}

impl ProcedureCategory {
    /// Whether procedures in this category count as complex / major surgery
    pub fn is_complex(&self) -> bool {
        matches!(self, ProcedureCategory::Cardiac | ProcedureCategory::Orthopedic)
    }

    /// Waiting period in months typically attached to this category
    ///
    /// Zero means no category-level waiting period applies.
    pub fn waiting_period_months(&self) -> u32 {
        match self {
            ProcedureCategory::Ophthalmic => 24,
            ProcedureCategory::Orthopedic => 24,
            ProcedureCategory::Cardiac => 24,
            ProcedureCategory::GeneralSurgery => 12,
            ProcedureCategory::Maternity => 9,
            ProcedureCategory::Dental
            | ProcedureCategory::Cosmetic
            | ProcedureCategory::Emergency => 0,
        }
    }

    /// Category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureCategory::Dental => "dental",
            ProcedureCategory::Ophthalmic => "ophthalmic",
            ProcedureCategory::Cardiac => "cardiac",
            ProcedureCategory::Orthopedic => "orthopedic",
            ProcedureCategory::Cosmetic => "cosmetic",
            ProcedureCategory::Maternity => "maternity",
            ProcedureCategory::GeneralSurgery => "general_surgery",
            ProcedureCategory::Emergency => "emergency",
        }
    }
}

/// Keyword variants mapped to (canonical name, category)
///
/// Ordering matters: more specific patterns come first so "emergency dental"
/// normalizes to the emergency canonical form.
const PROCEDURE_PATTERNS: &[(&str, &str, ProcedureCategory)] = &[
    ("emergency", "emergency treatment", ProcedureCategory::Emergency),
    ("accident", "accident treatment", ProcedureCategory::Emergency),
    ("urgent care", "emergency treatment", ProcedureCategory::Emergency),
    ("cataract", "cataract surgery", ProcedureCategory::Ophthalmic),
    ("eye surgery", "cataract surgery", ProcedureCategory::Ophthalmic),
    ("lens replacement", "cataract surgery", ProcedureCategory::Ophthalmic),
    ("refractive", "refractive surgery", ProcedureCategory::Ophthalmic),
    ("heart surgery", "heart surgery", ProcedureCategory::Cardiac),
    ("cardiac", "heart surgery", ProcedureCategory::Cardiac),
    ("bypass", "heart surgery", ProcedureCategory::Cardiac),
    ("angioplasty", "angioplasty", ProcedureCategory::Cardiac),
    ("knee replacement", "knee replacement", ProcedureCategory::Orthopedic),
    ("hip replacement", "hip replacement", ProcedureCategory::Orthopedic),
    ("joint replacement", "joint replacement", ProcedureCategory::Orthopedic),
    ("arthroplasty", "knee replacement", ProcedureCategory::Orthopedic),
    ("knee", "knee surgery", ProcedureCategory::Orthopedic),
    ("hip", "hip surgery", ProcedureCategory::Orthopedic),
    ("dental", "dental treatment", ProcedureCategory::Dental),
    ("tooth", "dental treatment", ProcedureCategory::Dental),
    ("oral surgery", "dental treatment", ProcedureCategory::Dental),
    ("cosmetic", "cosmetic surgery", ProcedureCategory::Cosmetic),
    ("plastic surgery", "cosmetic surgery", ProcedureCategory::Cosmetic),
    ("aesthetic", "cosmetic surgery", ProcedureCategory::Cosmetic),
    ("maternity", "maternity care", ProcedureCategory::Maternity),
    ("caesarean", "caesarean delivery", ProcedureCategory::Maternity),
    ("cesarean", "caesarean delivery", ProcedureCategory::Maternity),
    ("delivery", "maternity care", ProcedureCategory::Maternity),
    ("appendectomy", "appendectomy", ProcedureCategory::GeneralSurgery),
    ("appendix", "appendectomy", ProcedureCategory::GeneralSurgery),
    ("hernia", "hernia repair", ProcedureCategory::GeneralSurgery),
    ("gall bladder", "gall bladder surgery", ProcedureCategory::GeneralSurgery),
    ("hysterectomy", "hysterectomy", ProcedureCategory::GeneralSurgery),
];

/// A claimed procedure: the (possibly normalized) name plus its taxonomy
/// category when recognized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    /// Lowercased procedure name; canonical when the taxonomy matched
    pub name: String,

    /// Taxonomy category, `None` for free text outside the taxonomy
    pub category: Option<ProcedureCategory>,
}

impl Procedure {
    /// Normalize free text into the taxonomy where possible
    ///
    /// Unrecognized text is kept verbatim (lowercased) with no category;
    /// the evaluator scores it as an unrecognized procedure rather than
    /// guessing.
    pub fn normalize(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        for (pattern, canonical, category) in PROCEDURE_PATTERNS {
            if contains_phrase(&lowered, pattern) {
                return Self {
                    name: (*canonical).to_string(),
                    category: Some(*category),
                };
            }
        }
        Self {
            name: lowered,
            category: None,
        }
    }

    /// Whether this procedure falls in a complex / major-surgery category
    pub fn is_complex(&self) -> bool {
        self.category.map(|c| c.is_complex()).unwrap_or(false)
    }

    /// Waiting period attached to this procedure's category, if any
    pub fn waiting_period_months(&self) -> u32 {
        self.category.map(|c| c.waiting_period_months()).unwrap_or(0)
    }
}

/// Whether `text` contains `phrase` bounded by non-alphanumeric characters
///
/// Plain substring search would let short patterns fire inside unrelated
/// words ("hip" in "microchip").
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let mut from = 0;
    while let Some(offset) = text[from..].find(phrase) {
        let start = from + offset;
        let end = start + phrase.len();
        let left_ok = start == 0
            || !text[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == text.len()
            || !text[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        from = end;
    }
    false
}

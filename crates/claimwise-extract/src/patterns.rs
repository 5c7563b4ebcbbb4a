//! Pattern-based field extraction from free-text claim descriptions
//!
//! The pattern pass is the deterministic first stage: whatever it resolves
//! is never overwritten by the LLM fill. Each field has its own small set
//! of regexes; a field no pattern matches stays unset.

use claimwise_domain::{Gender, Procedure, StructuredQuery, NETWORK_CITIES};
use regex::Regex;
use std::sync::OnceLock;

fn age_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,3})\s*-?\s*(?:years?|yrs?)\s*-?\s*old\b")
            .unwrap_or_else(|e| panic!("invalid age regex: {}", e))
    })
}

fn age_labeled_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bage[d:\s]\s*(\d{1,3})\b|\b(\d{1,3})\s*y/?o\b")
            .unwrap_or_else(|e| panic!("invalid labeled age regex: {}", e))
    })
}

fn compact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "46M" / "32 F" shorthand common in claim notes
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,3})\s*([MF])\b")
            .unwrap_or_else(|e| panic!("invalid compact regex: {}", e))
    })
}

fn gender_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(male|female)\b")
            .unwrap_or_else(|e| panic!("invalid gender regex: {}", e))
    })
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "3-month-old insurance policy", "2 year policy"
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,3})\s*-?\s*(month|year)s?\s*-?\s*(?:old\s*)?(?:insurance\s+)?polic")
            .unwrap_or_else(|e| panic!("invalid duration regex: {}", e))
    })
}

fn duration_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "policy of 2 years", "policy active for 18 months"
    RE.get_or_init(|| {
        Regex::new(r"(?i)polic(?:y|ies)\s+(?:of|for|active\s+for|held\s+for)\s+(\d{1,3})\s*(month|year)")
            .unwrap_or_else(|e| panic!("invalid duration suffix regex: {}", e))
    })
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\u{20b9}|rs\.?|inr)\s*([\d,]+)|\b([\d,]+)\s*(?:rupees|rs)\b")
            .unwrap_or_else(|e| panic!("invalid amount regex: {}", e))
    })
}

/// Run every field pattern over the text and collect what matches
pub fn extract_fields(text: &str) -> StructuredQuery {
    let mut query = StructuredQuery::default();

    extract_age(text, &mut query);
    extract_gender(text, &mut query);
    extract_duration(text, &mut query);
    extract_amount(text, &mut query);
    extract_location(text, &mut query);
    extract_procedure(text, &mut query);

    query
}

fn extract_age(text: &str, query: &mut StructuredQuery) {
    for caps in age_re().captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        // "2-year-old policy" is a tenure statement, not an age
        let tail = text[whole.end()..].trim_start();
        if tail.to_lowercase().starts_with("polic") || tail.to_lowercase().starts_with("insurance")
        {
            continue;
        }
        if let Some(age) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            query.age = Some(age);
            return;
        }
    }

    if let Some(caps) = age_labeled_re().captures(text) {
        let matched = caps.get(1).or_else(|| caps.get(2));
        if let Some(age) = matched.and_then(|m| m.as_str().parse().ok()) {
            query.age = Some(age);
            return;
        }
    }

    if let Some(caps) = compact_re().captures(text) {
        if let Some(age) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            query.age = Some(age);
        }
    }
}

fn extract_gender(text: &str, query: &mut StructuredQuery) {
    if let Some(caps) = gender_re().captures(text) {
        if let Some(g) = caps.get(1).and_then(|m| Gender::parse(m.as_str())) {
            query.gender = Some(g);
            return;
        }
    }
    if let Some(caps) = compact_re().captures(text) {
        if let Some(g) = caps.get(2).and_then(|m| Gender::parse(m.as_str())) {
            query.gender = Some(g);
        }
    }
}

fn extract_duration(text: &str, query: &mut StructuredQuery) {
    let caps = duration_re()
        .captures(text)
        .or_else(|| duration_suffix_re().captures(text));
    let Some(caps) = caps else { return };

    let value: Option<u32> = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let unit = caps.get(2).map(|m| m.as_str().to_lowercase());
    if let (Some(value), Some(unit)) = (value, unit) {
        query.policy_duration_months = Some(if unit == "year" { value * 12 } else { value });
    }
}

fn extract_amount(text: &str, query: &mut StructuredQuery) {
    if let Some(caps) = amount_re().captures(text) {
        let matched = caps.get(1).or_else(|| caps.get(2));
        if let Some(m) = matched {
            let digits: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            if let Ok(amount) = digits.parse::<u64>() {
                if amount > 0 {
                    query.claim_amount = Some(amount);
                }
            }
        }
    }
}

fn extract_location(text: &str, query: &mut StructuredQuery) {
    let lowered = text.to_lowercase();
    for city in NETWORK_CITIES {
        if lowered.contains(&city.to_lowercase()) {
            query.location = Some(city.to_string());
            return;
        }
    }
}

fn extract_procedure(text: &str, query: &mut StructuredQuery) {
    let procedure = Procedure::normalize(text);
    // A taxonomy hit means a procedure keyword genuinely appeared; without
    // one, normalize would just echo the whole sentence back
    if procedure.category.is_some() {
        query.procedure = Some(procedure);
    }
}

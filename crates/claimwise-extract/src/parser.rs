//! Parse LLM fill responses into query fields

use crate::error::ExtractError;
use claimwise_domain::{Gender, Procedure, StructuredQuery};
use serde_json::Value;
use tracing::warn;

/// Parse an LLM JSON response into a partial query
///
/// Keys that are missing, null, or the wrong type are skipped with a
/// warning rather than failing the whole response; one bad field should
/// not discard the good ones.
pub fn parse_fill_response(response: &str) -> Result<StructuredQuery, ExtractError> {
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractError::InvalidFormat(format!("JSON parse error: {}", e)))?;
    let obj = json
        .as_object()
        .ok_or_else(|| ExtractError::InvalidFormat("Expected JSON object".to_string()))?;

    let mut query = StructuredQuery::default();

    if let Some(value) = obj.get("age").filter(|v| !v.is_null()) {
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(age) => query.age = Some(age),
            None => warn!(?value, "Discarding non-integer age"),
        }
    }

    if let Some(value) = obj.get("gender").filter(|v| !v.is_null()) {
        match value.as_str().and_then(Gender::parse) {
            Some(gender) => query.gender = Some(gender),
            None => warn!(?value, "Discarding unrecognized gender"),
        }
    }

    if let Some(name) = obj.get("procedure").and_then(|v| v.as_str()) {
        if !name.trim().is_empty() {
            query.procedure = Some(Procedure::normalize(name));
        }
    }

    if let Some(location) = obj.get("location").and_then(|v| v.as_str()) {
        if !location.trim().is_empty() {
            query.location = Some(location.trim().to_string());
        }
    }

    if let Some(value) = obj.get("policy_duration_months").filter(|v| !v.is_null()) {
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(months) => query.policy_duration_months = Some(months),
            None => warn!(?value, "Discarding non-integer policy duration"),
        }
    }

    if let Some(value) = obj.get("claim_amount").filter(|v| !v.is_null()) {
        match value.as_u64() {
            Some(amount) if amount > 0 => query.claim_amount = Some(amount),
            _ => warn!(?value, "Discarding non-positive claim amount"),
        }
    }

    Ok(query)
}

/// Strip a markdown code fence if the model wrapped its JSON in one
fn extract_json(response: &str) -> Result<String, ExtractError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractError::InvalidFormat("Empty code block".to_string()));
        }
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

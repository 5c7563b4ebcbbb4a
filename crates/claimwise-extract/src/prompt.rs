//! LLM prompt construction for field filling

use claimwise_domain::StructuredQuery;

const FILL_INSTRUCTIONS: &str = r#"Extract insurance claim fields from the text below.
Respond with a single JSON object and nothing else. Use exactly these keys:

{
  "age": <integer years or null>,
  "gender": <"male" | "female" | "other" | null>,
  "procedure": <procedure name string or null>,
  "location": <city name string or null>,
  "policy_duration_months": <integer months or null>,
  "claim_amount": <integer amount or null>
}

Use null for anything the text does not state. Never guess."#;

/// Build a prompt asking the model to fill fields the patterns missed
///
/// Fields already resolved are listed as known so the model does not
/// contradict them; only the remaining keys matter in the response.
pub fn build_fill_prompt(text: &str, resolved: &StructuredQuery) -> String {
    let mut prompt = String::new();
    prompt.push_str(FILL_INSTRUCTIONS);
    prompt.push_str("\n\n");

    let mut known = Vec::new();
    if let Some(age) = resolved.age {
        known.push(format!("age = {}", age));
    }
    if let Some(procedure) = &resolved.procedure {
        known.push(format!("procedure = {}", procedure.name));
    }
    if let Some(location) = &resolved.location {
        known.push(format!("location = {}", location));
    }
    if let Some(months) = resolved.policy_duration_months {
        known.push(format!("policy_duration_months = {}", months));
    }
    if !known.is_empty() {
        prompt.push_str("Already known (do not change):\n");
        for item in &known {
            prompt.push_str(&format!("- {}\n", item));
        }
        prompt.push('\n');
    }

    prompt.push_str("Claim text:\n---\n");
    prompt.push_str(text);
    prompt.push_str("\n---\n");

    prompt
}

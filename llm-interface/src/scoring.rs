use crate::strip_code_fences;
use jobbot_core::{CoreError, JobListing, LlmError, MatchScore};
use serde_json::Value;

pub fn scoring_prompt(query: &str, listing: &JobListing) -> String {
    let description = listing.description.as_deref().unwrap_or_default();
    format!(
        r#"Rate how well a job listing matches what a job seeker asked for.
Reply with only a JSON object: {{"score": <integer 0-100>, "reason": "<one short sentence>"}}.

Job seeker asked: "{}"

Listing:
Title: {}
Company: {}
Location: {}
Description: {}
"#,
        query.replace('"', "'"),
        listing.title,
        listing.company,
        listing.location,
        description
    )
}

fn malformed(details: &str) -> CoreError {
    CoreError::Llm(LlmError::MalformedOutput {
        details: details.to_string(),
    })
}

pub fn parse_score(output: &str) -> Result<MatchScore, CoreError> {
    let value: Value =
        serde_json::from_str(strip_code_fences(output)).map_err(|e| malformed(&e.to_string()))?;

    let score = match value.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| malformed("missing numeric score"))?;

    if !(0.0..=100.0).contains(&score) {
        return Err(malformed(&format!("score {} out of range", score)));
    }

    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(MatchScore {
        score: Some(score.round() as u8),
        reason,
    })
}

use crate::strip_code_fences;
use jobbot_core::{CoreError, JobType, LlmError, SearchIntent, DEFAULT_LOCATION};
use serde_json::Value;

pub fn intent_prompt(query: &str) -> String {
    format!(
        r#"You extract structured job search parameters from a user's message.
Reply with only a JSON object with the keys "keywords", "location" and "job_type".

- "keywords": the job title or skill being searched for. Be specific.
- "location": the city or area. Use "remote" when no location is given or the
  user asks for remote, work from home or wfh.
- "job_type": one of "full-time", "part-time", "internship" or "any". Use "any"
  when it is not stated.

User message: "{}"
"#,
        query.replace('"', "'")
    )
}

fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses model output into an intent, filling omitted fields with the
/// defaults. Output that is not a JSON object is an error.
pub fn parse_intent(query: &str, output: &str) -> Result<SearchIntent, CoreError> {
    let value: Value = serde_json::from_str(strip_code_fences(output)).map_err(|e| {
        LlmError::MalformedOutput {
            details: e.to_string(),
        }
    })?;
    let object = value.as_object().ok_or_else(|| LlmError::MalformedOutput {
        details: "expected a JSON object".to_string(),
    })?;

    Ok(SearchIntent {
        keywords: string_field(object, "keywords").unwrap_or_else(|| query.trim().to_string()),
        location: string_field(object, "location").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        job_type: string_field(object, "job_type")
            .map(|t| JobType::parse(&t))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_query() {
        let prompt = intent_prompt("wfh \"python\" jobs");
        assert!(prompt.contains("wfh 'python' jobs"));
        assert!(prompt.contains("job_type"));
    }

    #[test]
    fn test_full_intent() {
        let intent = parse_intent(
            "q",
            r#"{"keywords": "software engineer", "location": "remote", "job_type": "full-time"}"#,
        )
        .unwrap();
        assert_eq!(intent.keywords, "software engineer");
        assert_eq!(intent.location, "remote");
        assert_eq!(intent.job_type, JobType::FullTime);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let intent = parse_intent("python jobs", r#"{"location": ""}"#).unwrap();
        assert_eq!(intent.keywords, "python jobs");
        assert_eq!(intent.location, "remote");
        assert_eq!(intent.job_type, JobType::Any);
    }

    #[test]
    fn test_non_string_fields_get_defaults() {
        let intent = parse_intent("q", r#"{"keywords": ["a"], "job_type": 3}"#).unwrap();
        assert_eq!(intent.keywords, "q");
        assert_eq!(intent.job_type, JobType::Any);
    }

    #[test]
    fn test_malformed_output_is_error() {
        assert!(parse_intent("q", "not json").is_err());
        assert!(parse_intent("q", "[1, 2]").is_err());
    }
}

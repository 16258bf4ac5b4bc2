use crate::LlmProvider;
use async_trait::async_trait;
use jobbot_core::{CoreError, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const PROVIDER: &str = "gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http_client: Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(api_key, model, timeout, GEMINI_API_BASE.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        model: String,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str) -> Result<String, CoreError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    // The key travels in the query string.
                    CoreError::Network(e.without_url())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Gemini request failed with status: {}", status);
            let provider = PROVIDER.to_string();
            return Err(match status.as_u16() {
                400 | 401 | 403 => LlmError::InvalidApiKey { provider },
                404 => LlmError::ModelNotAvailable {
                    model: self.model.clone(),
                },
                429 => LlmError::RateLimitExceeded { provider },
                _ => LlmError::ServiceUnavailable { provider },
            }
            .into());
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Gemini response: {}", e.without_url());
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(LlmError::ContentFiltered { reason }.into());
            }
            return Err(LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
            .into());
        }

        debug!("Gemini returned {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> GeminiProvider {
        GeminiProvider::with_base_url(
            "test-key".to_string(),
            "gemini-pro".to_string(),
            Duration::from_secs(5),
            server.uri(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_generate_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "{\"keywords\":"}, {"text": " \"rust\"}"}]}}
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let text = provider.generate("prompt").await.unwrap();
        assert_eq!(text, "{\"keywords\": \"rust\"}");
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_content_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.generate("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::ContentFiltered { .. }))
        ));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert!(matches!(
            provider.generate("prompt").await,
            Err(CoreError::Llm(LlmError::RateLimitExceeded { .. }))
        ));
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider = GeminiProvider::with_base_url(
            "SECRET-GEMINI-KEY".to_string(),
            "gemini-pro".to_string(),
            Duration::from_secs(5),
            format!("http://127.0.0.1:{}", port),
        )
        .unwrap();

        let err = provider.generate("prompt").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)), "got {:?}", err);
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
        assert!(!format!("{:?}", err).contains("SECRET-GEMINI-KEY"));
    }
}

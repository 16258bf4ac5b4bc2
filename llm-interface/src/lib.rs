use async_trait::async_trait;
use jobbot_core::{CoreError, ErrorRecovery, JobListing, MatchScore, SearchIntent};
use std::sync::Arc;
use tracing::debug;

pub mod gemini;
pub mod intent;
pub mod scoring;

pub use gemini::GeminiProvider;

/// A hosted language model that turns a prompt into text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, CoreError>;
}

/// Removes a surrounding Markdown code fence (```json ... ```) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Intent extraction and relevance scoring over an optional model.
///
/// Without a model every query is searched literally and every listing is
/// left unscored.
#[derive(Clone, Default)]
pub struct QueryAnalyzer {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl QueryAnalyzer {
    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn extract_intent(&self, query: &str) -> SearchIntent {
        let Some(provider) = &self.provider else {
            debug!("No language model configured, searching literally");
            return SearchIntent::literal(query);
        };

        let result = match provider.generate(&intent::intent_prompt(query)).await {
            Ok(output) => intent::parse_intent(query, &output),
            Err(e) => Err(e),
        };
        ErrorRecovery::recover(result, "Intent extraction", || {
            SearchIntent::literal(query)
        })
    }

    pub async fn score_listing(&self, query: &str, listing: &JobListing) -> MatchScore {
        let Some(provider) = &self.provider else {
            return MatchScore::unavailable();
        };

        let prompt = scoring::scoring_prompt(query, listing);
        let result = match provider.generate(&prompt).await {
            Ok(output) => scoring::parse_score(&output),
            Err(e) => Err(e),
        };
        ErrorRecovery::recover(result, "Relevance scoring", MatchScore::unavailable)
    }
}

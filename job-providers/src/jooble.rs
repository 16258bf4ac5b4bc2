//! Jooble, the primary listing source.
//!
//! `POST {base}/api/{key}` with `{"keywords", "location"}` returns
//! `{"jobs": [...]}`.

use crate::client::{build_http_client, check_status, invalid_response, map_send_error};
use crate::JobProvider;
use async_trait::async_trait;
use jobbot_core::{or_placeholder, CoreError, JobListing, PLACEHOLDER, SALARY_PLACEHOLDER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const JOOBLE_API_BASE: &str = "https://jooble.org";
const PROVIDER: &str = "jooble";

#[derive(Debug, Serialize)]
struct JoobleRequest<'a> {
    keywords: &'a str,
    location: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct JoobleResponse {
    #[serde(default)]
    pub jobs: Vec<JoobleJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoobleJob {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl JoobleJob {
    /// `None` when the job carries no link.
    pub fn into_listing(self) -> Option<JobListing> {
        let link = self.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())?;
        Some(JobListing {
            title: or_placeholder(self.title, PLACEHOLDER),
            company: or_placeholder(self.company, PLACEHOLDER),
            location: or_placeholder(self.location, PLACEHOLDER),
            salary: or_placeholder(self.salary, SALARY_PLACEHOLDER),
            link,
            description: self.snippet.filter(|s| !s.trim().is_empty()),
        })
    }
}

pub struct JoobleClient {
    api_key: String,
    base_url: String,
    http_client: Client,
}

impl JoobleClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(api_key, timeout, JOOBLE_API_BASE.to_string())
    }

    pub fn with_base_url(
        api_key: String,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client(timeout)?,
        })
    }
}

#[async_trait]
impl JobProvider for JoobleClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, keyword: &str, location: &str) -> Result<Vec<JobListing>, CoreError> {
        let url = format!("{}/api/{}", self.base_url, self.api_key);
        let body = JoobleRequest {
            keywords: keyword,
            location,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response)?;

        let parsed: JoobleResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Jooble response: {}", e.without_url());
            invalid_response(PROVIDER, "Failed to parse jobs")
        })?;

        let listings: Vec<JobListing> = parsed
            .jobs
            .into_iter()
            .filter_map(JoobleJob::into_listing)
            .collect();

        info!("Found {} jobs on Jooble for '{}'", listings.len(), keyword);
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_conversion_fills_placeholders() {
        let job = JoobleJob {
            title: Some("Rust Developer".to_string()),
            company: None,
            location: Some("".to_string()),
            salary: None,
            link: Some("https://jooble.org/desc/1".to_string()),
            snippet: Some("Build things".to_string()),
        };

        let listing = job.into_listing().unwrap();
        assert_eq!(listing.title, "Rust Developer");
        assert_eq!(listing.company, "N/A");
        assert_eq!(listing.location, "N/A");
        assert_eq!(listing.salary, "Not specified");
        assert_eq!(listing.link, "https://jooble.org/desc/1");
        assert_eq!(listing.description.as_deref(), Some("Build things"));
    }

    #[test]
    fn test_job_without_link_is_dropped() {
        let job = JoobleJob {
            title: Some("Rust Developer".to_string()),
            company: None,
            location: None,
            salary: None,
            link: Some("  ".to_string()),
            snippet: None,
        };
        assert!(job.into_listing().is_none());
    }
}

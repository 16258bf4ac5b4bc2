//! Adzuna, the fallback listing source.
//!
//! `GET {base}/v1/api/jobs/{country}/search/{page}` authenticated with
//! `app_id`/`app_key` query parameters returns `{"results": [...]}`.

use crate::client::{build_http_client, check_status, invalid_response, map_send_error};
use crate::JobProvider;
use async_trait::async_trait;
use jobbot_core::{or_placeholder, CoreError, JobListing, PLACEHOLDER, SALARY_PLACEHOLDER};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info};

const ADZUNA_API_BASE: &str = "https://api.adzuna.com";
const PROVIDER: &str = "adzuna";
pub const RESULTS_PER_PAGE: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct AdzunaResponse {
    #[serde(default)]
    pub results: Vec<AdzunaJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayName {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdzunaJob {
    pub title: Option<String>,
    pub company: Option<DisplayName>,
    pub location: Option<DisplayName>,
    pub salary_max: Option<f64>,
    pub redirect_url: Option<String>,
    pub description: Option<String>,
}

fn format_salary(salary_max: Option<f64>) -> String {
    match salary_max {
        Some(max) if max > 0.0 => {
            if max.fract() == 0.0 {
                format!("Up to {}", max as u64)
            } else {
                format!("Up to {:.2}", max)
            }
        }
        _ => SALARY_PLACEHOLDER.to_string(),
    }
}

impl AdzunaJob {
    /// `None` when the job carries no redirect URL.
    pub fn into_listing(self) -> Option<JobListing> {
        let link = self
            .redirect_url
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())?;
        Some(JobListing {
            title: or_placeholder(self.title, PLACEHOLDER),
            company: or_placeholder(self.company.and_then(|c| c.display_name), PLACEHOLDER),
            location: or_placeholder(self.location.and_then(|l| l.display_name), PLACEHOLDER),
            salary: format_salary(self.salary_max),
            link,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

pub struct AdzunaClient {
    app_id: String,
    app_key: String,
    country: String,
    base_url: String,
    http_client: Client,
}

impl AdzunaClient {
    pub fn new(
        app_id: String,
        app_key: String,
        country: String,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        Self::with_base_url(app_id, app_key, country, timeout, ADZUNA_API_BASE.to_string())
    }

    pub fn with_base_url(
        app_id: String,
        app_key: String,
        country: String,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            app_id,
            app_key,
            country,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: build_http_client(timeout)?,
        })
    }

    pub async fn search_page(
        &self,
        keyword: &str,
        location: &str,
        page: u32,
    ) -> Result<Vec<JobListing>, CoreError> {
        let url = format!(
            "{}/v1/api/jobs/{}/search/{}",
            self.base_url, self.country, page
        );
        let per_page = RESULTS_PER_PAGE.to_string();
        let params = [
            ("app_id", self.app_id.as_str()),
            ("app_key", self.app_key.as_str()),
            ("results_per_page", per_page.as_str()),
            ("what", keyword),
            ("where", location),
            ("content-type", "application/json"),
        ];

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response)?;

        let parsed: AdzunaResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Adzuna response: {}", e.without_url());
            invalid_response(PROVIDER, "Failed to parse results")
        })?;

        let listings: Vec<JobListing> = parsed
            .results
            .into_iter()
            .filter_map(AdzunaJob::into_listing)
            .collect();

        info!("Found {} jobs on Adzuna for '{}'", listings.len(), keyword);
        Ok(listings)
    }
}

#[async_trait]
impl JobProvider for AdzunaClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, keyword: &str, location: &str) -> Result<Vec<JobListing>, CoreError> {
        self.search_page(keyword, location, 1).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(Some(45000.0)), "Up to 45000");
        assert_eq!(format_salary(Some(45000.5)), "Up to 45000.50");
        assert_eq!(format_salary(Some(0.0)), "Not specified");
        assert_eq!(format_salary(None), "Not specified");
    }

    #[test]
    fn test_job_conversion() {
        let job = AdzunaJob {
            title: Some("Data Analyst".to_string()),
            company: Some(DisplayName {
                display_name: Some("Initech".to_string()),
            }),
            location: None,
            salary_max: Some(52000.0),
            redirect_url: Some("https://adzuna.example/r/1".to_string()),
            description: None,
        };

        let listing = job.into_listing().unwrap();
        assert_eq!(listing.company, "Initech");
        assert_eq!(listing.location, "N/A");
        assert_eq!(listing.salary, "Up to 52000");
        assert_eq!(listing.link, "https://adzuna.example/r/1");
    }

    #[test]
    fn test_job_without_redirect_is_dropped() {
        let job = AdzunaJob {
            title: Some("Data Analyst".to_string()),
            company: None,
            location: None,
            salary_max: None,
            redirect_url: None,
            description: None,
        };
        assert!(job.into_listing().is_none());
    }
}

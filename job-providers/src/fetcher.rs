use crate::metrics::{CallOutcome, MetricsCollector, ProviderCall};
use crate::{AdzunaClient, JobProvider, JoobleClient};
use jobbot_core::{AppConfig, CoreError, ErrorExt, JobListing, ProviderError, PLACEHOLDER};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Most listings returned from one fetch.
pub const MAX_LISTINGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub outcome: CallOutcome,
}

/// What one fetch did: the listings it settled on and every provider it
/// asked on the way.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub listings: Vec<JobListing>,
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchReport {
    /// The provider whose listings were returned.
    pub fn served_by(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| matches!(a.outcome, CallOutcome::Listings(_)))
            .map(|a| a.provider.as_str())
    }

    pub fn all_failed(&self) -> bool {
        !self.attempts.is_empty()
            && self
                .attempts
                .iter()
                .all(|a| matches!(a.outcome, CallOutcome::Failed(_)))
    }
}

/// Queries providers in priority order and returns the first non-empty
/// result set. Failures and empty results fall through to the next provider.
pub struct JobFetcher {
    providers: Vec<Arc<dyn JobProvider>>,
    timeout: Duration,
    metrics: Arc<MetricsCollector>,
}

impl JobFetcher {
    pub fn new(providers: Vec<Arc<dyn JobProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            timeout,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Builds the configured providers: Jooble first, then Adzuna.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let mut providers: Vec<Arc<dyn JobProvider>> = Vec::new();

        match &config.jooble {
            Some(jooble) => providers.push(Arc::new(JoobleClient::new(
                jooble.api_key.clone(),
                config.provider_timeout,
            )?)),
            None => warn!("JOOBLE_API_KEY not set, primary job provider disabled"),
        }

        match &config.adzuna {
            Some(adzuna) => providers.push(Arc::new(AdzunaClient::new(
                adzuna.app_id.clone(),
                adzuna.app_key.clone(),
                adzuna.country.clone(),
                config.provider_timeout,
            )?)),
            None => warn!("ADZUNA_APP_ID/ADZUNA_API_KEY not set, fallback job provider disabled"),
        }

        if providers.is_empty() {
            warn!("No job providers configured, every search will come back empty");
        }

        Ok(Self::new(providers, config.provider_timeout))
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub async fn fetch(&self, keyword: &str, location: &str) -> Vec<JobListing> {
        self.fetch_report(keyword, location).await.listings
    }

    pub async fn fetch_report(&self, keyword: &str, location: &str) -> FetchReport {
        let mut report = FetchReport::default();

        for provider in &self.providers {
            let name = provider.name().to_string();
            let started = Instant::now();

            let outcome =
                match tokio::time::timeout(self.timeout, provider.search(keyword, location)).await
                {
                    Ok(Ok(mut listings)) => {
                        listings.retain(|l| !l.link.trim().is_empty() && l.link != PLACEHOLDER);
                        listings.truncate(MAX_LISTINGS);
                        if listings.is_empty() {
                            info!("{} returned no jobs for '{}' in '{}'", name, keyword, location);
                            CallOutcome::Empty
                        } else {
                            report.listings = listings;
                            CallOutcome::Listings(report.listings.len())
                        }
                    }
                    Ok(Err(e)) => {
                        if e.is_transient() {
                            warn!("{} search failed ({}): {}", name, e.error_code(), e);
                        } else {
                            e.log_error();
                        }
                        CallOutcome::Failed(e.to_string())
                    }
                    Err(_) => {
                        let e = ProviderError::RequestTimeout {
                            provider: name.clone(),
                        };
                        warn!("{} search abandoned: {}", name, e);
                        CallOutcome::Failed(e.to_string())
                    }
                };

            self.metrics
                .record_call(ProviderCall {
                    provider: name.clone(),
                    outcome: outcome.clone(),
                    response_time: started.elapsed(),
                })
                .await;

            let done = matches!(outcome, CallOutcome::Listings(_));
            report.attempts.push(ProviderAttempt {
                provider: name,
                outcome,
            });
            if done {
                break;
            }
        }

        debug!(
            "Fetch for '{}' in '{}' returned {} listings after {} attempts",
            keyword,
            location,
            report.listings.len(),
            report.attempts.len()
        );
        report
    }
}

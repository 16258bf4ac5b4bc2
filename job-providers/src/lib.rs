use async_trait::async_trait;
use jobbot_core::{CoreError, JobListing};

pub mod adzuna;
mod client;
pub mod fetcher;
pub mod jooble;
pub mod metrics;

#[cfg(test)]
mod tests;

pub use adzuna::AdzunaClient;
pub use fetcher::{FetchReport, JobFetcher, ProviderAttempt, MAX_LISTINGS};
pub use jooble::JoobleClient;
pub use metrics::{CallOutcome, MetricsCollector, ProviderStats};

/// An external job-listing source.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Listings in provider order, already normalized.
    async fn search(&self, keyword: &str, location: &str) -> Result<Vec<JobListing>, CoreError>;
}

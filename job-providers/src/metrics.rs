use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Listings(usize),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub provider: String,
    pub outcome: CallOutcome,
    pub response_time: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStats {
    pub calls: u64,
    pub non_empty: u64,
    pub empty: u64,
    pub failed: u64,
    pub listings_returned: u64,
    pub total_response_time: Duration,
    pub last_call_time: Option<SystemTime>,
    pub last_error: Option<String>,
}

impl ProviderStats {
    fn update(&mut self, call: &ProviderCall) {
        self.calls += 1;
        self.total_response_time += call.response_time;
        self.last_call_time = Some(SystemTime::now());

        match &call.outcome {
            CallOutcome::Listings(count) => {
                self.non_empty += 1;
                self.listings_returned += *count as u64;
            }
            CallOutcome::Empty => self.empty += 1,
            CallOutcome::Failed(reason) => {
                self.failed += 1;
                self.last_error = Some(reason.clone());
            }
        }
    }

    pub fn average_response_time(&self) -> Duration {
        if self.calls == 0 {
            Duration::from_millis(0)
        } else {
            self.total_response_time / self.calls as u32
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.failed as f64 / self.calls as f64
        }
    }
}

/// In-memory per-provider call counters.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    stats: Arc<RwLock<HashMap<String, ProviderStats>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_call(&self, call: ProviderCall) {
        let mut stats = self.stats.write().await;
        stats
            .entry(call.provider.clone())
            .or_default()
            .update(&call);
    }

    pub async fn get_provider_stats(&self, provider: &str) -> Option<ProviderStats> {
        self.stats.read().await.get(provider).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<String, ProviderStats> {
        self.stats.read().await.clone()
    }

    /// One line per provider, sorted by name, for log output.
    pub async fn summary(&self) -> String {
        let stats = self.stats.read().await;
        let mut names: Vec<&String> = stats.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let s = &stats[name];
                format!(
                    "{}: calls={} non_empty={} empty={} failed={} ({:.0}%) avg={:?}",
                    name,
                    s.calls,
                    s.non_empty,
                    s.empty,
                    s.failed,
                    s.failure_rate() * 100.0,
                    s.average_response_time()
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub async fn export_metrics(&self) -> Result<String, serde_json::Error> {
        let snapshot = self.snapshot().await;
        serde_json::to_string_pretty(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CallOutcome, JobFetcher, JobProvider, MAX_LISTINGS};
    use async_trait::async_trait;
    use jobbot_core::{CoreError, JobListing, ProviderError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    enum Behaviour {
        Listings(usize),
        Empty,
        Fail,
        Hang,
        PlaceholderLinks,
    }

    struct FakeProvider {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn listing(source: &str, index: usize) -> JobListing {
        JobListing {
            title: format!("{} job {}", source, index),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            salary: "Not specified".to_string(),
            link: format!("https://{}.example/jobs/{}", source, index),
            description: None,
        }
    }

    #[async_trait]
    impl JobProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn search(&self, _keyword: &str, _location: &str) -> Result<Vec<JobListing>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Listings(n) => Ok((0..n).map(|i| listing(self.name, i)).collect()),
                Behaviour::Empty => Ok(Vec::new()),
                Behaviour::Fail => Err(CoreError::Provider(ProviderError::ServerError {
                    provider: self.name.to_string(),
                    status_code: 502,
                })),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(vec![listing(self.name, 0)])
                }
                Behaviour::PlaceholderLinks => {
                    let mut bad = listing(self.name, 0);
                    bad.link = "N/A".to_string();
                    let mut blank = listing(self.name, 1);
                    blank.link = "   ".to_string();
                    Ok(vec![bad, blank])
                }
            }
        }
    }

    fn fetcher(providers: Vec<Arc<FakeProvider>>) -> JobFetcher {
        let providers: Vec<Arc<dyn JobProvider>> = providers
            .into_iter()
            .map(|p| p as Arc<dyn JobProvider>)
            .collect();
        JobFetcher::new(providers, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_primary_results_skip_fallback() {
        let primary = FakeProvider::new("primary", Behaviour::Listings(3));
        let fallback = FakeProvider::new("fallback", Behaviour::Listings(3));
        let fetcher = fetcher(vec![primary.clone(), fallback.clone()]);

        let report = fetcher.fetch_report("rust", "remote").await;

        assert_eq!(report.listings.len(), 3);
        assert!(report.listings.iter().all(|l| l.link.contains("primary")));
        assert_eq!(report.served_by(), Some("primary"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back() {
        let primary = FakeProvider::new("primary", Behaviour::Fail);
        let fallback = FakeProvider::new("fallback", Behaviour::Listings(2));
        let fetcher = fetcher(vec![primary.clone(), fallback.clone()]);

        let report = fetcher.fetch_report("rust", "remote").await;

        assert_eq!(report.listings.len(), 2);
        assert_eq!(report.served_by(), Some("fallback"));
        assert!(matches!(report.attempts[0].outcome, CallOutcome::Failed(_)));
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_empty_falls_back() {
        let primary = FakeProvider::new("primary", Behaviour::Empty);
        let fallback = FakeProvider::new("fallback", Behaviour::Listings(4));
        let fetcher = fetcher(vec![primary, fallback]);

        let listings = fetcher.fetch("rust", "remote").await;
        assert_eq!(listings.len(), 4);
        assert!(listings.iter().all(|l| l.link.contains("fallback")));
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_empty() {
        let fetcher = fetcher(vec![
            FakeProvider::new("primary", Behaviour::Fail),
            FakeProvider::new("fallback", Behaviour::Fail),
        ]);

        let report = fetcher.fetch_report("rust", "remote").await;
        assert!(report.listings.is_empty());
        assert!(report.all_failed());
        assert_eq!(report.served_by(), None);
    }

    #[tokio::test]
    async fn test_no_providers_yields_empty() {
        let fetcher = fetcher(Vec::new());
        let report = fetcher.fetch_report("rust", "remote").await;
        assert!(report.listings.is_empty());
        assert!(!report.all_failed());
    }

    #[tokio::test]
    async fn test_results_capped() {
        let fetcher = fetcher(vec![FakeProvider::new("primary", Behaviour::Listings(12))]);
        let listings = fetcher.fetch("rust", "remote").await;
        assert_eq!(listings.len(), MAX_LISTINGS);
        assert_eq!(listings[0].title, "primary job 0");
        assert_eq!(listings[4].title, "primary job 4");
    }

    #[tokio::test]
    async fn test_slow_provider_is_abandoned() {
        let primary = FakeProvider::new("primary", Behaviour::Hang);
        let fallback = FakeProvider::new("fallback", Behaviour::Listings(1));
        let fetcher = fetcher(vec![primary, fallback]);

        let report = fetcher.fetch_report("rust", "remote").await;
        assert_eq!(report.served_by(), Some("fallback"));
        match &report.attempts[0].outcome {
            CallOutcome::Failed(reason) => assert!(reason.contains("timed out")),
            other => panic!("expected a failed attempt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_listings_without_links_are_dropped() {
        let primary = FakeProvider::new("primary", Behaviour::PlaceholderLinks);
        let fallback = FakeProvider::new("fallback", Behaviour::Listings(1));
        let fetcher = fetcher(vec![primary, fallback]);

        let report = fetcher.fetch_report("rust", "remote").await;
        assert_eq!(report.attempts[0].outcome, CallOutcome::Empty);
        assert_eq!(report.listings.len(), 1);
        assert!(report.listings.iter().all(|l| l.link.starts_with("https://")));
    }

    #[tokio::test]
    async fn test_fetch_records_metrics() {
        let fetcher = fetcher(vec![
            FakeProvider::new("primary", Behaviour::Fail),
            FakeProvider::new("fallback", Behaviour::Listings(2)),
        ]);
        fetcher.fetch("rust", "remote").await;
        fetcher.fetch("go", "remote").await;

        let metrics = fetcher.metrics();
        let primary = metrics.get_provider_stats("primary").await.unwrap();
        let fallback = metrics.get_provider_stats("fallback").await.unwrap();
        assert_eq!(primary.calls, 2);
        assert_eq!(primary.failed, 2);
        assert_eq!(fallback.non_empty, 2);
        assert_eq!(fallback.listings_returned, 4);
    }
}

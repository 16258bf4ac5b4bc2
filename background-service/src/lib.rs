use database::Database;
use job_providers::JobFetcher;
use jobbot_core::format::{alert_listing_message, alert_summary_message};
use jobbot_core::{
    AlertSubscription, CoreError, ErrorExt, ErrorRecovery, MessageSender, RecoveryStrategy,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub mod schedule;


pub use schedule::DailySchedule;

/// Counts from one pass over the subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertRunSummary {
    pub subscribers: usize,
    pub delivered_users: usize,
    pub listings_sent: usize,
    pub without_results: usize,
    pub failed_users: usize,
}

/// Delivers every subscriber's daily alert at the scheduled time.
///
/// Alerts bypass the search quota. Subscribers are served one after another;
/// a failure for one of them is logged and the run moves on.
pub struct AlertScheduler {
    db: Arc<Database>,
    fetcher: Arc<JobFetcher>,
    sender: Arc<dyn MessageSender>,
    schedule: DailySchedule,
}

impl AlertScheduler {
    pub fn new(
        db: Arc<Database>,
        fetcher: Arc<JobFetcher>,
        sender: Arc<dyn MessageSender>,
        schedule: DailySchedule,
    ) -> Self {
        Self {
            db,
            fetcher,
            sender,
            schedule,
        }
    }

    pub fn schedule(&self) -> DailySchedule {
        self.schedule
    }

    /// Sleeps until each trigger and runs the delivery, until `shutdown`
    /// flips to `true` or its sender is dropped.
    pub async fn run_until_shutdown(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Alert scheduler started: daily at {} {}",
            self.schedule.time,
            self.schedule.timezone.name()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = chrono::Utc::now();
            let next = self.schedule.next_trigger_after(now);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!("Next alert run at {} (in {:?})", next, wait);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    match self.deliver_daily_alerts().await {
                        Ok(summary) => info!("Alert run finished: {:?}", summary),
                        Err(e) => {
                            e.log_error();
                            error!("Alert run aborted before any delivery");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Alert scheduler stopped");
    }

    /// One pass over all subscribers. Only failing to list the subscribers
    /// fails the run.
    pub async fn deliver_daily_alerts(&self) -> Result<AlertRunSummary, CoreError> {
        let subscriptions = self.db.list_subscribed().await?;
        info!("Running daily job alert for {} users", subscriptions.len());

        let mut summary = AlertRunSummary {
            subscribers: subscriptions.len(),
            ..Default::default()
        };

        for subscription in &subscriptions {
            match self.deliver_to(subscription).await {
                Ok(0) => summary.without_results += 1,
                Ok(sent) => {
                    summary.delivered_users += 1;
                    summary.listings_sent += sent;
                }
                Err(e) => {
                    summary.failed_users += 1;
                    match ErrorRecovery::determine_strategy(&e) {
                        RecoveryStrategy::Skip => warn!(
                            "Skipping daily jobs for {} ({}): {}",
                            subscription.user_id,
                            e.error_code(),
                            e
                        ),
                        _ => {
                            e.log_error();
                            error!("Failed to send daily jobs to {}", subscription.user_id);
                        }
                    }
                }
            }
        }

        info!("Provider metrics: {}", self.fetcher.metrics().summary().await);
        match self.fetcher.metrics().export_metrics().await {
            Ok(json) => debug!("Provider metrics export: {}", json),
            Err(e) => warn!("Could not export provider metrics: {}", e),
        }
        Ok(summary)
    }

    /// Summary first, then one message per listing. Returns the number of
    /// listings sent.
    async fn deliver_to(&self, subscription: &AlertSubscription) -> Result<usize, CoreError> {
        let listings = self
            .fetcher
            .fetch(&subscription.keyword, &subscription.location)
            .await;
        if listings.is_empty() {
            debug!(
                "No alert listings for user {} ('{}' in '{}')",
                subscription.user_id, subscription.keyword, subscription.location
            );
            return Ok(0);
        }

        self.sender
            .send(
                subscription.user_id,
                alert_summary_message(&subscription.keyword, listings.len()),
            )
            .await?;
        for listing in &listings {
            self.sender
                .send(subscription.user_id, alert_listing_message(listing))
                .await?;
        }
        Ok(listings.len())
    }
}

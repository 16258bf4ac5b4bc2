use background_service::{AlertScheduler, DailySchedule};
use database::Database;
use job_providers::JobFetcher;
use jobbot_core::{AppConfig, CoreError, ErrorExt, MessageSender};
use llm_interface::{GeminiProvider, LlmProvider, QueryAnalyzer};
use payments::RazorpayClient;
use std::sync::Arc;
use std::time::Duration;
use telegram_bot::{Bot, BotDeps, TelegramClient};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jobbot=info,telegram_bot=info,background_service=info,job_providers=info,llm_interface=info,payments=info,database=info,jobbot_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting UOR Job Bot");

    let config = AppConfig::load().map_err(|e| {
        e.log_error();
        tracing::error!("{}", e.user_friendly_message());
        CoreError::from(e)
    })?;

    let mut db = Database::new(config.database_url.clone());
    db.connect().await?;
    db.run_migrations().await?;
    let db = Arc::new(db);

    let llm: Option<Arc<dyn LlmProvider>> = match &config.llm {
        Some(llm) => Some(Arc::new(GeminiProvider::new(
            llm.api_key.clone(),
            llm.model.clone(),
            config.provider_timeout,
        )?)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, searches will use the literal query and skip scoring");
            None
        }
    };

    let payments = match &config.payments {
        Some(payment_config) => Some(Arc::new(RazorpayClient::new(
            payment_config,
            config.provider_timeout,
        )?)),
        None => {
            tracing::warn!("RAZORPAY_KEY_ID/RAZORPAY_KEY_SECRET not set, premium upgrades disabled");
            None
        }
    };

    let fetcher = Arc::new(JobFetcher::from_config(&config)?);
    tracing::info!("Job providers: {:?}", fetcher.provider_names());

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_bot_token.clone(),
        TELEGRAM_TIMEOUT,
    )?);
    let sender: Arc<dyn MessageSender> = telegram.clone();

    let bot = Arc::new(Bot::new(BotDeps {
        db: db.clone(),
        fetcher: fetcher.clone(),
        analyzer: QueryAnalyzer::new(llm),
        payments,
        sender: sender.clone(),
        quota_clock: config.quota_clock,
        admin_user_ids: config.admin_user_ids.clone(),
    }));

    let scheduler = AlertScheduler::new(
        db,
        fetcher,
        sender,
        DailySchedule::new(config.alert_time, config.alert_timezone),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_task = {
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { scheduler.run_until_shutdown(shutdown).await })
    };
    let mut polling = tokio::spawn(telegram_bot::run_polling(telegram, bot, shutdown_rx));

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
            tracing::info!("Shutdown requested");
            None
        }
        joined = &mut polling => Some(joined),
    };

    // Also reached when polling ended on its own.
    let _ = shutdown_tx.send(true);
    let joined = match finished {
        Some(joined) => joined,
        None => polling.await,
    };
    if let Err(e) = scheduler_task.await {
        tracing::error!("Alert scheduler task failed: {}", e);
    }

    tracing::info!("Bot stopped");
    joined.map_err(|e| CoreError::Internal {
        message: format!("polling task failed: {}", e),
    })?
}

use crate::commands::Command;
use crate::conversation::{Conversations, Rejection, SetupState, Transition};
use crate::texts;
use database::Database;
use job_providers::JobFetcher;
use jobbot_core::format::scored_listing_message;
use jobbot_core::{
    may_search, CoreError, ErrorExt, ErrorRecovery, MessageSender, OutgoingMessage, PaymentError,
    QuotaClock, RecoveryStrategy, UserId,
};
use llm_interface::QueryAnalyzer;
use payments::RazorpayClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// One inbound event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text {
        user_id: UserId,
        chat_id: i64,
        first_name: String,
        text: String,
    },
    Callback {
        user_id: UserId,
        chat_id: i64,
        data: String,
    },
}

impl Incoming {
    pub fn user_id(&self) -> UserId {
        match self {
            Incoming::Text { user_id, .. } | Incoming::Callback { user_id, .. } => *user_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            Incoming::Text { chat_id, .. } | Incoming::Callback { chat_id, .. } => *chat_id,
        }
    }
}

/// The services a [`Bot`] talks to.
pub struct BotDeps {
    pub db: Arc<Database>,
    pub fetcher: Arc<JobFetcher>,
    pub analyzer: QueryAnalyzer,
    pub payments: Option<Arc<RazorpayClient>>,
    pub sender: Arc<dyn MessageSender>,
    pub quota_clock: QuotaClock,
    pub admin_user_ids: Vec<UserId>,
}

/// Chat front end: commands, the alert setup dialogue, quota-gated search
/// and the premium upgrade.
///
/// Events from the same user are handled one at a time so the quota check
/// and the counter bump cannot interleave.
pub struct Bot {
    deps: BotDeps,
    conversations: Conversations,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl Bot {
    pub fn new(deps: BotDeps) -> Self {
        Self {
            deps,
            conversations: Conversations::default(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        self.user_locks
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// Drops the user's entry once no other event for them holds or awaits it.
    async fn release_user_lock(&self, user_id: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&user_id);
        }
    }

    #[cfg(test)]
    pub(crate) async fn tracked_users(&self) -> usize {
        self.user_locks.lock().await.len()
    }

    /// Handles one event. Failures are logged and, where the user is still
    /// reachable, answered with a generic apology.
    pub async fn handle(&self, incoming: Incoming) {
        let user_id = incoming.user_id();
        let lock = self.user_lock(user_id).await;
        {
            let _guard = lock.lock().await;
            self.dispatch(incoming).await;
        }
        self.release_user_lock(user_id, lock).await;
    }

    async fn dispatch(&self, incoming: Incoming) {
        let user_id = incoming.user_id();
        let chat_id = incoming.chat_id();
        let result = match incoming {
            Incoming::Text {
                first_name, text, ..
            } => self.handle_text(user_id, chat_id, &first_name, &text).await,
            Incoming::Callback { data, .. } => self.handle_callback(user_id, chat_id, &data).await,
        };

        if let Err(e) = result {
            match ErrorRecovery::determine_strategy(&e) {
                RecoveryStrategy::Skip => {
                    warn!("Could not reach user {} ({}): {}", user_id, e.error_code(), e)
                }
                _ => {
                    e.log_error();
                    if let Err(send_err) = self.reply(chat_id, texts::SOMETHING_WENT_WRONG).await {
                        send_err.log_warn();
                    }
                }
            }
        }
    }

    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), CoreError> {
        self.deps.sender.send(chat_id, message).await
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), CoreError> {
        self.send(chat_id, OutgoingMessage::text(text)).await
    }

    async fn reply_html(&self, chat_id: i64, text: impl Into<String>) -> Result<(), CoreError> {
        self.send(chat_id, OutgoingMessage::html(text)).await
    }

    async fn handle_text(
        &self,
        user_id: UserId,
        chat_id: i64,
        first_name: &str,
        text: &str,
    ) -> Result<(), CoreError> {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(user_id, chat_id, first_name, command).await;
        }

        if let Some(state) = self.conversations.take(user_id).await {
            return self.continue_setup(user_id, chat_id, state, text).await;
        }

        self.search(user_id, chat_id, text).await
    }

    async fn handle_command(
        &self,
        user_id: UserId,
        chat_id: i64,
        first_name: &str,
        command: Command,
    ) -> Result<(), CoreError> {
        debug!("User {} sent {:?}", user_id, command);
        match command {
            Command::Start => {
                if self.deps.db.ensure_user(user_id).await? {
                    info!("New user {}", user_id);
                }
                self.reply_html(chat_id, texts::welcome(first_name)).await
            }
            Command::Help => self.reply_html(chat_id, texts::HELP).await,
            Command::Daily => {
                self.conversations.begin(user_id).await;
                self.reply(chat_id, texts::DAILY_START).await
            }
            Command::Cancel => {
                self.conversations.cancel(user_id).await;
                self.reply(chat_id, texts::SETUP_CANCELLED).await
            }
            Command::Stop => {
                if self.conversations.cancel(user_id).await {
                    return self.reply(chat_id, texts::SETUP_CANCELLED).await;
                }
                self.deps.db.ensure_user(user_id).await?;
                self.deps.db.clear_alert(user_id).await?;
                info!("User {} unsubscribed from daily alerts", user_id);
                self.reply(chat_id, texts::UNSUBSCRIBED).await
            }
            Command::Premium => {
                self.deps.db.ensure_user(user_id).await?;
                if self.deps.db.get_user(user_id).await?.premium {
                    return self.reply(chat_id, texts::ALREADY_PREMIUM).await;
                }
                self.send(
                    chat_id,
                    OutgoingMessage::html(texts::PREMIUM_OFFER)
                        .with_callback_button(texts::PAY_BUTTON, texts::START_PAYMENT),
                )
                .await
            }
            Command::Grant(args) if self.deps.admin_user_ids.contains(&user_id) => {
                self.grant(chat_id, &args).await
            }
            Command::Grant(_) | Command::Unknown(_) => {
                self.reply(chat_id, texts::UNKNOWN_COMMAND).await
            }
        }
    }

    async fn continue_setup(
        &self,
        user_id: UserId,
        chat_id: i64,
        state: SetupState,
        text: &str,
    ) -> Result<(), CoreError> {
        match state.advance(text) {
            Ok(Transition::Ask(next)) => {
                let prompt = match &next {
                    SetupState::AwaitingLocation { keyword } => texts::ask_location(keyword),
                    SetupState::AwaitingSalary { location, .. } => texts::ask_salary(location),
                    SetupState::AwaitingKeyword => texts::DAILY_START.to_string(),
                };
                self.conversations.put(user_id, next).await;
                self.reply_html(chat_id, prompt).await
            }
            Err(Rejection { state, error }) => {
                if ErrorRecovery::determine_strategy(&error) != RecoveryStrategy::Reprompt {
                    return Err(error);
                }
                debug!("Re-prompting user {}: {}", user_id, error);
                let prompt = match &state {
                    SetupState::AwaitingKeyword => texts::KEYWORD_REPROMPT,
                    SetupState::AwaitingLocation { .. } => texts::LOCATION_REPROMPT,
                    SetupState::AwaitingSalary { .. } => texts::SALARY_REPROMPT,
                };
                self.conversations.put(user_id, state).await;
                self.reply(chat_id, prompt).await
            }
            Ok(Transition::Done(request)) => {
                self.deps
                    .db
                    .set_alert(
                        user_id,
                        &request.keyword,
                        &request.location,
                        request.min_salary,
                    )
                    .await?;
                info!(
                    "User {} subscribed to '{}' in '{}'",
                    user_id, request.keyword, request.location
                );
                self.reply_html(
                    chat_id,
                    texts::alert_confirmed(&request.keyword, &request.location, request.min_salary),
                )
                .await
            }
        }
    }

    async fn search(&self, user_id: UserId, chat_id: i64, query: &str) -> Result<(), CoreError> {
        self.deps.db.ensure_user(user_id).await?;
        let record = self.deps.db.get_user(user_id).await?;
        let today = self.deps.quota_clock.today();

        if !may_search(&record, today) {
            debug!("User {} is out of free searches for {}", user_id, today);
            return self.reply(chat_id, texts::QUOTA_EXHAUSTED).await;
        }
        if !record.premium {
            let used = self.deps.db.bump_search_count(user_id, today).await?;
            debug!("User {} has used {} searches on {}", user_id, used, today);
        }

        self.reply(chat_id, texts::UNDERSTANDING).await?;
        let intent = self.deps.analyzer.extract_intent(query).await;

        self.reply(chat_id, &texts::searching(&intent.keywords, &intent.location))
            .await?;
        let listings = self
            .deps
            .fetcher
            .fetch(&intent.keywords, &intent.location)
            .await;

        if listings.is_empty() {
            return self.reply(chat_id, texts::NO_JOBS).await;
        }

        for listing in &listings {
            let score = self.deps.analyzer.score_listing(query, listing).await;
            self.send(chat_id, scored_listing_message(listing, &score))
                .await?;
        }
        Ok(())
    }

    async fn handle_callback(
        &self,
        user_id: UserId,
        chat_id: i64,
        data: &str,
    ) -> Result<(), CoreError> {
        if data != texts::START_PAYMENT {
            debug!("Ignoring unknown callback '{}' from {}", data, user_id);
            return Ok(());
        }

        self.deps.db.ensure_user(user_id).await?;
        if self.deps.db.get_user(user_id).await?.premium {
            return self.reply(chat_id, texts::ALREADY_PREMIUM).await;
        }

        self.reply(chat_id, texts::GENERATING_LINK).await?;

        let link = match &self.deps.payments {
            Some(payments) => payments.create_payment_link(user_id).await,
            None => Err(PaymentError::NotConfigured.into()),
        };

        match link {
            Ok(url) => {
                self.send(
                    chat_id,
                    OutgoingMessage::text(texts::LINK_READY)
                        .with_url_button(texts::PAY_LINK_BUTTON, url),
                )
                .await
            }
            Err(e) => {
                warn!(
                    "Payment link for user {} unavailable ({}): {}",
                    user_id,
                    e.error_code(),
                    e
                );
                self.reply(chat_id, texts::PAYMENT_LINK_FAILED).await
            }
        }
    }

    async fn grant(&self, chat_id: i64, args: &str) -> Result<(), CoreError> {
        let Ok(target) = args.trim().parse::<UserId>() else {
            return self.reply(chat_id, texts::GRANT_USAGE).await;
        };

        self.deps.db.ensure_user(target).await?;
        self.deps.db.grant_premium(target).await?;
        info!("Granted lifetime premium to user {}", target);
        self.reply(chat_id, &texts::premium_granted(target)).await
    }
}

//! Minimal Telegram Bot API client: long polling, sending messages and
//! acknowledging inline button presses.

use async_trait::async_trait;
use jobbot_core::{Button, CoreError, MessageSender, OutgoingMessage, TelegramError, UserId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_data: Option<String>,
}

impl From<&Button> for InlineKeyboardButton {
    fn from(button: &Button) -> Self {
        match button {
            Button::Url { text, url } => Self {
                text: text.clone(),
                url: Some(url.clone()),
                callback_data: None,
            },
            Button::Callback { text, data } => Self {
                text: text.clone(),
                url: None,
                callback_data: Some(data.clone()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
}

pub struct TelegramClient {
    token: String,
    base_url: String,
    http_client: Client,
}

impl TelegramClient {
    pub fn new(token: String, timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(token, timeout, TELEGRAM_API_BASE.to_string())
    }

    pub fn with_base_url(
        token: String,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::builder().timeout(timeout).build()?,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<B, T>(
        &self,
        method: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http_client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The bot token is part of the method URL.
        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await.map_err(|e| {
            error!(
                "Failed to parse Telegram {} response ({}): {}",
                method,
                status,
                e.without_url()
            );
            TelegramError::InvalidResponse {
                details: format!("{} returned an unreadable body", method),
            }
        })?;

        if parsed.ok {
            debug!("Telegram {} succeeded", method);
            return parsed.result.ok_or_else(|| {
                TelegramError::InvalidResponse {
                    details: format!("{} returned ok without a result", method),
                }
                .into()
            });
        }

        let error_code = parsed.error_code.unwrap_or(status.as_u16());
        let description = parsed.description.unwrap_or_default();
        Err(match error_code {
            401 => TelegramError::Unauthorized,
            _ => TelegramError::Api {
                error_code,
                description,
            },
        }
        .into())
    }

    /// Long-polls for updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, CoreError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message", "callback_query"],
        };
        self.call(
            "getUpdates",
            &body,
            Some(Duration::from_secs(timeout_secs + 10)),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        message: &OutgoingMessage,
    ) -> Result<(), CoreError> {
        let reply_markup = if message.buttons.is_empty() {
            None
        } else {
            Some(InlineKeyboardMarkup {
                inline_keyboard: message
                    .buttons
                    .iter()
                    .map(|row| row.iter().map(InlineKeyboardButton::from).collect())
                    .collect(),
            })
        };
        let body = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.map(|m| m.as_str()),
            reply_markup,
            disable_web_page_preview: true,
        };

        match self
            .call::<_, serde_json::Value>("sendMessage", &body, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(CoreError::Telegram(TelegramError::Api { error_code: 403, .. })) => {
                warn!("Chat {} has blocked the bot", chat_id);
                Err(TelegramError::Blocked { chat_id }.into())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), CoreError> {
        let body = AnswerCallbackRequest { callback_query_id };
        self.call::<_, bool>("answerCallbackQuery", &body, None)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, chat_id: UserId, message: OutgoingMessage) -> Result<(), CoreError> {
        self.send_message(chat_id, &message).await
    }
}

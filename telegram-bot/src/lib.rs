use jobbot_core::{CoreError, ErrorExt, TelegramError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

pub mod api;
pub mod commands;
pub mod conversation;
pub mod handlers;
pub mod texts;


pub use api::{TelegramClient, Update};
pub use handlers::{Bot, BotDeps, Incoming};

/// Seconds Telegram holds a `getUpdates` call open when there is nothing new.
pub const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Converts a raw update into a bot event. Updates without a sender or
/// text are dropped.
pub fn incoming_from_update(update: Update) -> Option<Incoming> {
    if let Some(message) = update.message {
        let from = message.from?;
        let text = message.text?;
        return Some(Incoming::Text {
            user_id: from.id,
            chat_id: message.chat.id,
            first_name: from.first_name,
            text,
        });
    }

    let query = update.callback_query?;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat.id)
        .unwrap_or(query.from.id);
    Some(Incoming::Callback {
        user_id: query.from.id,
        chat_id,
        data: query.data.unwrap_or_default(),
    })
}

/// Long-polls Telegram and hands each update to `bot` on its own task until
/// `shutdown` flips to `true`. Returns an error only if the token is rejected.
pub async fn run_polling(
    client: Arc<TelegramClient>,
    bot: Arc<Bot>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), CoreError> {
    info!("Bot is polling for updates");
    let mut offset: Option<i64> = None;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let polled = tokio::select! {
            polled = client.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(CoreError::Telegram(TelegramError::Unauthorized)) => {
                return Err(TelegramError::Unauthorized.into());
            }
            Err(e) => {
                if e.is_transient() {
                    e.log_warn();
                } else {
                    e.log_error();
                }
                tokio::select! {
                    _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                    _ = shutdown.changed() => {}
                }
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);

            if let Some(query) = &update.callback_query {
                if let Err(e) = client.answer_callback_query(&query.id).await {
                    e.log_warn();
                }
            }

            match incoming_from_update(update) {
                Some(incoming) => {
                    let bot = bot.clone();
                    tokio::spawn(async move { bot.handle(incoming).await });
                }
                None => debug!("Skipping update without text or sender"),
            }
        }
    }

    info!("Bot stopped polling");
    Ok(())
}

#[cfg(test)]
mod update_tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_message_update() {
        let update = parse(serde_json::json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "is_bot": false, "first_name": "Asha"},
                "chat": {"id": 42, "type": "private"},
                "text": "rust jobs"
            }
        }));

        assert_eq!(
            incoming_from_update(update),
            Some(Incoming::Text {
                user_id: 42,
                chat_id: 42,
                first_name: "Asha".to_string(),
                text: "rust jobs".to_string(),
            })
        );
    }

    #[test]
    fn test_callback_update() {
        let update = parse(serde_json::json!({
            "update_id": 11,
            "callback_query": {
                "id": "cb1",
                "from": {"id": 42, "first_name": "Asha"},
                "message": {"message_id": 5, "chat": {"id": 42}},
                "data": "start_payment"
            }
        }));

        assert_eq!(
            incoming_from_update(update),
            Some(Incoming::Callback {
                user_id: 42,
                chat_id: 42,
                data: "start_payment".to_string(),
            })
        );
    }

    #[test]
    fn test_non_text_message_is_skipped() {
        let update = parse(serde_json::json!({
            "update_id": 12,
            "message": {
                "message_id": 1,
                "from": {"id": 42, "first_name": "Asha"},
                "chat": {"id": 42}
            }
        }));
        assert_eq!(incoming_from_update(update), None);
    }
}

use crate::{CoreError, UserId};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
        }
    }
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Url { text: String, url: String },
    Callback { text: String, data: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// Rows of inline buttons.
    pub buttons: Vec<Vec<Button>>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            buttons: Vec::new(),
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Html),
            buttons: Vec::new(),
        }
    }

    pub fn with_url_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.buttons.push(vec![Button::Url {
            text: text.into(),
            url: url.into(),
        }]);
        self
    }

    pub fn with_callback_button(
        mut self,
        text: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        self.buttons.push(vec![Button::Callback {
            text: text.into(),
            data: data.into(),
        }]);
        self
    }
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: UserId, message: OutgoingMessage) -> Result<(), CoreError>;
}

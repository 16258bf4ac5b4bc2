//! Razorpay payment links for the lifetime premium upgrade.
//!
//! The link carries the Telegram user id in its notes so a payment can be
//! matched back to the account that asked for it.

use jobbot_core::{ConfigError, CoreError, PaymentConfig, PaymentError, UserId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};
use url::Url;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

/// ₹79.00 in paise.
pub const LIFETIME_PRICE_PAISE: u64 = 7900;
pub const CURRENCY: &str = "INR";
pub const LINK_DESCRIPTION: &str = "UOR Job Bot - Lifetime Premium";

#[derive(Debug, Serialize)]
struct PaymentLinkRequest {
    amount: u64,
    currency: &'static str,
    accept_partial: bool,
    description: &'static str,
    customer: Customer,
    notify: Notify,
    reminder_enable: bool,
    notes: Notes,
    callback_url: String,
    callback_method: &'static str,
}

#[derive(Debug, Serialize)]
struct Customer {
    email: String,
}

#[derive(Debug, Serialize)]
struct Notify {
    sms: bool,
    email: bool,
}

#[derive(Debug, Serialize)]
struct Notes {
    telegram_user_id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkResponse {
    short_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
}

fn link_request(user_id: UserId, callback_url: &str) -> PaymentLinkRequest {
    PaymentLinkRequest {
        amount: LIFETIME_PRICE_PAISE,
        currency: CURRENCY,
        accept_partial: false,
        description: LINK_DESCRIPTION,
        customer: Customer {
            email: format!("user_{}@uorjob.bot", user_id),
        },
        notify: Notify {
            sms: false,
            email: false,
        },
        reminder_enable: false,
        notes: Notes {
            telegram_user_id: user_id.to_string(),
        },
        callback_url: callback_url.to_string(),
        callback_method: "get",
    }
}

pub struct RazorpayClient {
    key_id: String,
    key_secret: String,
    callback_url: Url,
    base_url: String,
    http_client: Client,
}

impl RazorpayClient {
    pub fn new(config: &PaymentConfig, timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(config, timeout, RAZORPAY_API_BASE.to_string())
    }

    pub fn with_base_url(
        config: &PaymentConfig,
        timeout: Duration,
        base_url: String,
    ) -> Result<Self, CoreError> {
        let callback_url = Url::parse(&config.callback_url).map_err(|_| {
            ConfigError::InvalidValue {
                field: "PAYMENT_CALLBACK_URL".to_string(),
                value: config.callback_url.clone(),
            }
        })?;

        Ok(Self {
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            callback_url,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Creates a one-off link for the lifetime upgrade and returns its
    /// hosted short URL.
    pub async fn create_payment_link(&self, user_id: UserId) -> Result<String, CoreError> {
        let url = format!("{}/v1/payment_links", self.base_url);
        let body = link_request(user_id, self.callback_url.as_str());

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let description = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| status.to_string());
            error!(
                "Payment link creation for user {} failed with {}: {}",
                user_id, status, description
            );
            return Err(PaymentError::Rejected {
                status_code: status.as_u16(),
                description,
            }
            .into());
        }

        let parsed: PaymentLinkResponse = response.json().await?;
        let short_url = parsed
            .short_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(PaymentError::MissingShortUrl)?;

        info!("Created payment link for user {}", user_id);
        Ok(short_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_request_shape() {
        let body = serde_json::to_value(link_request(42, "https://t.me/UORJOB_bot")).unwrap();

        assert_eq!(body["amount"], 7900);
        assert_eq!(body["currency"], "INR");
        assert_eq!(body["accept_partial"], false);
        assert_eq!(body["customer"]["email"], "user_42@uorjob.bot");
        assert_eq!(body["notify"]["sms"], false);
        assert_eq!(body["notify"]["email"], false);
        assert_eq!(body["reminder_enable"], false);
        assert_eq!(body["notes"]["telegram_user_id"], "42");
        assert_eq!(body["callback_url"], "https://t.me/UORJOB_bot");
        assert_eq!(body["callback_method"], "get");
    }

    #[test]
    fn test_invalid_callback_url_rejected() {
        let config = PaymentConfig {
            key_id: "rzp_test".to_string(),
            key_secret: "secret".to_string(),
            callback_url: "not a url".to_string(),
        };
        let result = RazorpayClient::new(&config, Duration::from_secs(5));
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}

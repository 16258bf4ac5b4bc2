//! Process configuration, built once at startup and handed to each component.
//!
//! Secrets come from the environment only. Non-secret settings may also come
//! from a TOML file named by `JOBBOT_CONFIG`; environment values win.

use crate::{ConfigError, QuotaClock, UserId};
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "JOBBOT_CONFIG";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:uor_job_bot.db?mode=rwc";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_ADZUNA_COUNTRY: &str = "gb";
pub const DEFAULT_PAYMENT_CALLBACK_URL: &str = "https://t.me/UORJOB_bot";

#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Clone)]
pub struct JoobleConfig {
    pub api_key: String,
}

#[derive(Clone)]
pub struct AdzunaConfig {
    pub app_id: String,
    pub app_key: String,
    pub country: String,
}

#[derive(Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    pub callback_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub llm: Option<LlmConfig>,
    pub jooble: Option<JoobleConfig>,
    pub adzuna: Option<AdzunaConfig>,
    pub payments: Option<PaymentConfig>,
    pub alert_time: NaiveTime,
    pub alert_timezone: Tz,
    pub quota_clock: QuotaClock,
    pub provider_timeout: Duration,
    pub admin_user_ids: Vec<UserId>,
}

/// Non-secret settings accepted from the optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub database_url: Option<String>,
    pub alert_time: Option<String>,
    pub alert_timezone: Option<String>,
    pub quota_timezone: Option<String>,
    pub provider_timeout_secs: Option<u64>,
    pub adzuna_country: Option<String>,
    pub gemini_model: Option<String>,
    pub payment_callback_url: Option<String>,
    pub admin_user_ids: Option<Vec<UserId>>,
}

impl FileSettings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }
}

impl AppConfig {
    /// Loads from the process environment and the optional settings file.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => FileSettings::from_file(Path::new(&path))?,
            _ => FileSettings::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(file: FileSettings, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let telegram_bot_token =
            var("TELEGRAM_BOT_TOKEN").ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: "TELEGRAM_BOT_TOKEN".to_string(),
            })?;

        let database_url = var("DATABASE_URL")
            .or(file.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let llm = var("GEMINI_API_KEY").map(|api_key| LlmConfig {
            api_key,
            model: var("GEMINI_MODEL")
                .or(file.gemini_model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        });

        let jooble = var("JOOBLE_API_KEY").map(|api_key| JoobleConfig { api_key });

        let adzuna = match (var("ADZUNA_APP_ID"), var("ADZUNA_API_KEY")) {
            (Some(app_id), Some(app_key)) => Some(AdzunaConfig {
                app_id,
                app_key,
                country: var("ADZUNA_COUNTRY")
                    .or(file.adzuna_country)
                    .unwrap_or_else(|| DEFAULT_ADZUNA_COUNTRY.to_string())
                    .to_lowercase(),
            }),
            _ => None,
        };

        let payments = match (var("RAZORPAY_KEY_ID"), var("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(PaymentConfig {
                key_id,
                key_secret,
                callback_url: var("PAYMENT_CALLBACK_URL")
                    .or(file.payment_callback_url)
                    .unwrap_or_else(|| DEFAULT_PAYMENT_CALLBACK_URL.to_string()),
            }),
            _ => None,
        };

        let alert_time = match var("ALERT_TIME").or(file.alert_time) {
            Some(value) => parse_time("ALERT_TIME", &value)?,
            None => NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        };

        let alert_timezone = match var("ALERT_TIMEZONE").or(file.alert_timezone) {
            Some(value) => parse_timezone("ALERT_TIMEZONE", &value)?,
            None => Tz::UTC,
        };

        let quota_clock = match var("QUOTA_TIMEZONE").or(file.quota_timezone) {
            Some(value) => QuotaClock::Zone(parse_timezone("QUOTA_TIMEZONE", &value)?),
            None => QuotaClock::HostLocal,
        };

        let timeout_secs = match var("PROVIDER_TIMEOUT_SECS") {
            Some(value) => parse_positive("PROVIDER_TIMEOUT_SECS", &value)?,
            None => file
                .provider_timeout_secs
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "provider_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        let admin_user_ids = match var("ADMIN_USER_IDS") {
            Some(value) => parse_id_list("ADMIN_USER_IDS", &value)?,
            None => file.admin_user_ids.unwrap_or_default(),
        };

        Ok(Self {
            telegram_bot_token,
            database_url,
            llm,
            jooble,
            adzuna,
            payments,
            alert_time,
            alert_timezone,
            quota_clock,
            provider_timeout: Duration::from_secs(timeout_secs),
            admin_user_ids,
        })
    }
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| invalid(field, value))
}

fn parse_timezone(field: &str, value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| invalid(field, value))
}

fn parse_positive(field: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid(field, value))
}

fn parse_id_list(field: &str, value: &str) -> Result<Vec<UserId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<UserId>().map_err(|_| invalid(field, s)))
        .collect()
}

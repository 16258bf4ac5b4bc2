use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    /// True when the failure comes from an external call that may succeed
    /// next time and should degrade to a fallback rather than surface.
    fn is_transient(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Provider(e) => {
                error!("Provider error details: {:?}", e);
            }
            CoreError::Database(e) => {
                error!("Database error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::Payment(e) => {
                error!("Payment error details: {:?}", e);
            }
            CoreError::Telegram(e) => {
                error!("Telegram error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            CoreError::Provider(e) => e.is_transient(),
            CoreError::Database(e) => e.is_transient(),
            CoreError::Llm(e) => e.is_transient(),
            CoreError::Payment(e) => e.is_transient(),
            CoreError::Telegram(e) => e.is_transient(),
            CoreError::Network(_) => true,
            CoreError::Serialization(_) => true,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Provider(e) => e.user_friendly_message(),
            CoreError::Database(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::Payment(e) => e.user_friendly_message(),
            CoreError::Telegram(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please try again in a moment.".to_string()
            }
            CoreError::InvalidInput { message } => {
                format!("That doesn't look right: {}", message)
            }
            CoreError::NotFound { resource } => format!("Could not find: {}", resource),
            _ => "Sorry, something went wrong. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Provider(_) => "PROVIDER".to_string(),
            CoreError::Database(_) => "DATABASE".to_string(),
            CoreError::Llm(_) => "LLM".to_string(),
            CoreError::Payment(_) => "PAYMENT".to_string(),
            CoreError::Telegram(_) => "TELEGRAM".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::NotFound { .. } => "NOT_FOUND".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for ProviderError {
    fn log_error(&self) -> &Self {
        error!("ProviderError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ProviderError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        !matches!(self, ProviderError::AuthenticationFailed { .. })
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ProviderError::RequestTimeout { provider } => {
                format!("{} took too long to answer. Please try again.", provider)
            }
            _ => "The job listing service is having trouble. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ProviderError::AuthenticationFailed { .. } => "PROVIDER_AUTH_FAILED".to_string(),
            ProviderError::RateLimitExceeded { .. } => "PROVIDER_RATE_LIMIT".to_string(),
            ProviderError::RequestTimeout { .. } => "PROVIDER_TIMEOUT".to_string(),
            ProviderError::HttpStatus { .. } => "PROVIDER_HTTP_STATUS".to_string(),
            ProviderError::ServerError { .. } => "PROVIDER_SERVER_ERROR".to_string(),
            ProviderError::InvalidResponse { .. } => "PROVIDER_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for DatabaseError {
    fn log_error(&self) -> &Self {
        error!("DatabaseError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("DatabaseError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        matches!(
            self,
            DatabaseError::DatabaseLocked | DatabaseError::ConnectionFailed { .. }
        )
    }

    fn user_friendly_message(&self) -> String {
        match self {
            DatabaseError::DatabaseLocked => {
                "Database is temporarily busy. Please try again.".to_string()
            }
            _ => "Sorry, something went wrong. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            DatabaseError::ConnectionFailed { .. } => "DB_CONNECTION_FAILED".to_string(),
            DatabaseError::NotConnected => "DB_NOT_CONNECTED".to_string(),
            DatabaseError::MigrationFailed { .. } => "DB_MIGRATION_FAILED".to_string(),
            DatabaseError::InvalidValue { .. } => "DB_INVALID_VALUE".to_string(),
            DatabaseError::DatabaseLocked => "DB_LOCKED".to_string(),
            DatabaseError::Sql(_) => "DB_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        !matches!(self, LlmError::InvalidApiKey { .. })
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::InvalidApiKey { provider } => format!(
                "Invalid API key for {}. Please update your credentials.",
                provider
            ),
            LlmError::ServiceUnavailable { provider } => format!(
                "{} service is temporarily unavailable. Please try again later.",
                provider
            ),
            _ => "AI service error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::InvalidApiKey { .. } => "LLM_INVALID_API_KEY".to_string(),
            LlmError::RateLimitExceeded { .. } => "LLM_RATE_LIMIT".to_string(),
            LlmError::ModelNotAvailable { .. } => "LLM_MODEL_NOT_AVAILABLE".to_string(),
            LlmError::ContentFiltered { .. } => "LLM_CONTENT_FILTERED".to_string(),
            LlmError::ServiceUnavailable { .. } => "LLM_SERVICE_UNAVAILABLE".to_string(),
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_INVALID_RESPONSE".to_string(),
            LlmError::MalformedOutput { .. } => "LLM_MALFORMED_OUTPUT".to_string(),
        }
    }
}

impl ErrorExt for PaymentError {
    fn log_error(&self) -> &Self {
        error!("PaymentError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("PaymentError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            PaymentError::Rejected { status_code, .. } => *status_code >= 500,
            PaymentError::MissingShortUrl => true,
            PaymentError::NotConfigured => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        "Sorry, we couldn't create a payment link. Please try again later.".to_string()
    }

    fn error_code(&self) -> String {
        match self {
            PaymentError::NotConfigured => "PAYMENT_NOT_CONFIGURED".to_string(),
            PaymentError::Rejected { .. } => "PAYMENT_REJECTED".to_string(),
            PaymentError::MissingShortUrl => "PAYMENT_MISSING_SHORT_URL".to_string(),
        }
    }
}

impl ErrorExt for TelegramError {
    fn log_error(&self) -> &Self {
        error!("TelegramError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("TelegramError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        match self {
            TelegramError::Api { error_code, .. } => *error_code == 429 || *error_code >= 500,
            TelegramError::InvalidResponse { .. } => true,
            TelegramError::Unauthorized | TelegramError::Blocked { .. } => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        "Message delivery failed.".to_string()
    }

    fn error_code(&self) -> String {
        match self {
            TelegramError::Unauthorized => "TELEGRAM_UNAUTHORIZED".to_string(),
            TelegramError::Blocked { .. } => "TELEGRAM_BLOCKED".to_string(),
            TelegramError::Api { .. } => "TELEGRAM_API".to_string(),
            TelegramError::InvalidResponse { .. } => "TELEGRAM_INVALID_RESPONSE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_transient(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::MissingEnvironmentVariable { var_name } => format!(
                "Environment variable '{}' is required but not set.",
                var_name
            ),
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::MissingEnvironmentVariable { .. } => "CONFIG_MISSING_ENV_VAR".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Job provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Authentication rejected by {provider}")]
    AuthenticationFailed { provider: String },

    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Request to {provider} timed out")]
    RequestTimeout { provider: String },

    #[error("{provider} returned HTTP {status_code}")]
    HttpStatus { provider: String, status_code: u16 },

    #[error("Server error from {provider}: {status_code}")]
    ServerError { provider: String, status_code: u16 },

    #[error("Invalid response from {provider}: {details}")]
    InvalidResponse { provider: String, details: String },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Not connected")]
    NotConnected,

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Invalid stored value in {column}: {value}")]
    InvalidValue { column: String, value: String },

    #[error("Database locked")]
    DatabaseLocked,

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API key invalid or missing for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    #[error("Model not available: {model}")]
    ModelNotAvailable { model: String },

    #[error("Content filtered by provider: {reason}")]
    ContentFiltered { reason: String },

    #[error("Provider service unavailable: {provider}")]
    ServiceUnavailable { provider: String },

    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Invalid response format from {provider}")]
    InvalidResponseFormat { provider: String },

    #[error("Model output is not the expected JSON: {details}")]
    MalformedOutput { details: String },
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("Payment provider rejected the request ({status_code}): {description}")]
    Rejected {
        status_code: u16,
        description: String,
    },

    #[error("Payment link response carried no short URL")]
    MissingShortUrl,
}

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Bot token rejected by Telegram")]
    Unauthorized,

    #[error("Chat {chat_id} blocked the bot or is unreachable")]
    Blocked { chat_id: i64 },

    #[error("Telegram API error {error_code}: {description}")]
    Api {
        error_code: u16,
        description: String,
    },

    #[error("Invalid Telegram response: {details}")]
    InvalidResponse { details: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

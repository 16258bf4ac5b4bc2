use jobbot_core::{
    ConfigError, CoreError, DatabaseError, ErrorExt, LlmError, PaymentError,
    ProviderError, TelegramError,
};

#[test]
fn test_error_codes() {
    let provider_error = CoreError::Provider(ProviderError::RequestTimeout {
        provider: "jooble".to_string(),
    });
    assert_eq!(provider_error.error_code(), "PROVIDER");

    let db_error = CoreError::Database(DatabaseError::DatabaseLocked);
    assert_eq!(db_error.error_code(), "DATABASE");

    let llm_error = CoreError::Llm(LlmError::InvalidApiKey {
        provider: "gemini".to_string(),
    });
    assert_eq!(llm_error.error_code(), "LLM");

    let payment_error = CoreError::Payment(PaymentError::MissingShortUrl);
    assert_eq!(payment_error.error_code(), "PAYMENT");

    let config_error = CoreError::Config(ConfigError::InvalidValue {
        field: "ALERT_TIME".to_string(),
        value: "25:00".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let input_error = CoreError::InvalidInput {
        message: "salary must be a whole number".to_string(),
    };
    assert_eq!(input_error.error_code(), "INVALID_INPUT");
}

#[test]
fn test_transient_errors() {
    let transient = CoreError::Provider(ProviderError::ServerError {
        provider: "adzuna".to_string(),
        status_code: 503,
    });
    assert!(transient.is_transient());

    let bad_key = CoreError::Provider(ProviderError::AuthenticationFailed {
        provider: "jooble".to_string(),
    });
    assert!(!bad_key.is_transient());

    let blocked = CoreError::Telegram(TelegramError::Blocked { chat_id: 9 });
    assert!(!blocked.is_transient());

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "TELEGRAM_BOT_TOKEN".to_string(),
    });
    assert!(!config_error.is_transient());
}

#[test]
fn test_user_friendly_messages() {
    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "TELEGRAM_BOT_TOKEN".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("TELEGRAM_BOT_TOKEN"));

    let payment_error = CoreError::Payment(PaymentError::NotConfigured);
    assert!(payment_error
        .user_friendly_message()
        .contains("couldn't create a payment link"));
}

//! Error recovery strategies for the different failure classes.
//!
//! Nothing here retries. Every external failure either falls back to a
//! default value, skips one recipient, re-prompts the user, or fails the
//! operation outright.

use crate::{CoreError, ErrorExt};
use tracing::warn;

/// Recovery strategy for handling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Substitute a default, placeholder, or the next provider
    Fallback,
    /// Skip this item (one alert recipient) and continue with the rest
    Skip,
    /// Ask the user for the input again
    Reprompt,
    /// Propagate the error
    Fail,
}

/// Error recovery handler that maps errors onto strategies
pub struct ErrorRecovery;

impl ErrorRecovery {
    /// Determine the appropriate recovery strategy for a given error
    pub fn determine_strategy(error: &CoreError) -> RecoveryStrategy {
        match error {
            // External calls degrade locally
            CoreError::Provider(_)
            | CoreError::Llm(_)
            | CoreError::Payment(_)
            | CoreError::Network(_)
            | CoreError::Serialization(_) => RecoveryStrategy::Fallback,

            // A single chat being unreachable must not stop a batch
            CoreError::Telegram(_) => RecoveryStrategy::Skip,

            // Rejected dialogue answers
            CoreError::InvalidInput { .. } => RecoveryStrategy::Reprompt,

            // A missing record during a batch only affects that record
            CoreError::NotFound { .. } => RecoveryStrategy::Skip,

            CoreError::Database(_)
            | CoreError::Config(_)
            | CoreError::Internal { .. } => RecoveryStrategy::Fail,
        }
    }

    /// Degrade a failed result to `fallback()`, logging what was lost.
    ///
    /// Errors whose strategy is not `Fallback` are still degraded, but are
    /// logged at error level since they point at something other than a
    /// flaky upstream.
    pub fn recover<T, F>(result: Result<T, CoreError>, context: &str, fallback: F) -> T
    where
        F: FnOnce() -> T,
    {
        match result {
            Ok(value) => value,
            Err(error) => {
                if Self::determine_strategy(&error) == RecoveryStrategy::Fallback {
                    warn!(
                        "{} failed ({}), using fallback: {}",
                        context,
                        error.error_code(),
                        error
                    );
                } else {
                    error.log_error();
                }
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, DatabaseError, LlmError, ProviderError, TelegramError};

    #[test]
    fn test_determine_strategy() {
        let provider_error = CoreError::Provider(ProviderError::RequestTimeout {
            provider: "jooble".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&provider_error),
            RecoveryStrategy::Fallback
        );

        let blocked = CoreError::Telegram(TelegramError::Blocked { chat_id: 7 });
        assert_eq!(
            ErrorRecovery::determine_strategy(&blocked),
            RecoveryStrategy::Skip
        );

        let bad_salary = CoreError::InvalidInput {
            message: "salary".to_string(),
        };
        assert_eq!(
            ErrorRecovery::determine_strategy(&bad_salary),
            RecoveryStrategy::Reprompt
        );

        let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
            var_name: "TELEGRAM_BOT_TOKEN".to_string(),
        });
        assert_eq!(
            ErrorRecovery::determine_strategy(&config_error),
            RecoveryStrategy::Fail
        );

        let db_error = CoreError::Database(DatabaseError::NotConnected);
        assert_eq!(
            ErrorRecovery::determine_strategy(&db_error),
            RecoveryStrategy::Fail
        );
    }

    #[test]
    fn test_recover_passes_value_through() {
        let value = ErrorRecovery::recover(Ok::<_, CoreError>(5), "count", || 0);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_recover_uses_fallback() {
        let result: Result<&str, CoreError> = Err(CoreError::Llm(LlmError::MalformedOutput {
            details: "not json".to_string(),
        }));
        let value = ErrorRecovery::recover(result, "intent extraction", || "default");
        assert_eq!(value, "default");
    }
}

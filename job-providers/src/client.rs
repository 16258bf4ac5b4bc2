use jobbot_core::{CoreError, ProviderError};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error};

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, CoreError> {
    Ok(Client::builder()
        .user_agent(concat!("jobbot/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Request URLs carry API keys, so they are stripped before the error is
/// logged or stored.
pub(crate) fn map_send_error(provider: &str, error: reqwest::Error) -> CoreError {
    let error = error.without_url();
    error!("Network error for {}: {}", provider, error);
    if error.is_timeout() {
        CoreError::Provider(ProviderError::RequestTimeout {
            provider: provider.to_string(),
        })
    } else {
        CoreError::Network(error)
    }
}

/// Turns a non-success response into the matching provider error.
pub(crate) fn check_status(provider: &str, response: Response) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("{} responded {}", provider, status);
        return Ok(response);
    }

    error!("{} request failed with status: {}", provider, status);
    let provider = provider.to_string();
    let status_code = status.as_u16();
    Err(CoreError::Provider(match status_code {
        401 | 403 => ProviderError::AuthenticationFailed { provider },
        429 => ProviderError::RateLimitExceeded { provider },
        500..=599 => ProviderError::ServerError {
            provider,
            status_code,
        },
        _ => ProviderError::HttpStatus {
            provider,
            status_code,
        },
    }))
}

pub(crate) fn invalid_response(provider: &str, details: impl Into<String>) -> CoreError {
    CoreError::Provider(ProviderError::InvalidResponse {
        provider: provider.to_string(),
        details: details.into(),
    })
}

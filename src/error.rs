//! Error types for the answer exchange

use thiserror::Error;

/// Why an exchange with the answer service failed.
///
/// Every variant is shown to the user the same way (the configured
/// unreachable message); the variant only matters for logging.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The service answered with a non-2xx status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Request exceeded the configured timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),
}

impl ExchangeError {
    /// Short label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeError::Status(_) => "status",
            ExchangeError::Transport(_) => "transport",
            ExchangeError::Decode(_) => "decode",
            ExchangeError::Timeout(_) => "timeout",
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExchangeError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ExchangeError::Status(status.as_u16())
        } else {
            ExchangeError::Transport(err)
        }
    }
}

/// Errors reported by the login gate, displayed verbatim under the form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Please enter both username and password to continue your learning journey.")]
    MissingFields,
    #[error("Username should be at least {0} characters long.")]
    UsernameTooShort(usize),
    #[error("Password should be at least {0} characters long.")]
    PasswordTooShort(usize),
}

//! Login gate shown before the chat
//!
//! Purely cosmetic: the fields are length-checked, then a fixed delay
//! plays out and the chat opens. Nothing is sent anywhere.

use std::time::Duration;

use crate::error::LoginError;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 4;

/// How long the "Authenticating..." state lasts
pub const AUTH_DELAY: Duration = Duration::from_millis(1500);

/// Credentials as typed, already trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
}

/// Check the form fields. Both fields are trimmed first.
pub fn validate(username: &str, password: &str) -> Result<Credentials, LoginError> {
    let username = username.trim();
    let password = password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(LoginError::MissingFields);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(LoginError::UsernameTooShort(MIN_USERNAME_LEN));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LoginError::PasswordTooShort(MIN_PASSWORD_LEN));
    }

    Ok(Credentials {
        username: username.to_string(),
    })
}

/// Validate, then wait out the authentication delay
pub async fn authenticate(username: &str, password: &str) -> Result<Credentials, LoginError> {
    let credentials = validate(username, password)?;
    tracing::info!(username = %credentials.username, "authenticating");
    tokio::time::sleep(AUTH_DELAY).await;
    Ok(credentials)
}

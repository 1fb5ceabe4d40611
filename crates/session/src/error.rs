//! Authentication errors surfaced to login and registration forms
//!
//! Credential failures are values, never panics. The single known
//! invalid-credentials rejection is translated to the localized form
//! message; every other provider message passes through verbatim.

use pixdia_backend::BackendError;
use thiserror::Error;

/// Provider message for a credential mismatch, the one case we localize.
const INVALID_LOGIN_MESSAGE: &str = "Invalid login credentials";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// Wrong email/password pair.
    #[error("E-mail ou senha incorretos.")]
    InvalidCredentials,

    /// Local validation failure; carries the localized field message.
    #[error("{0}")]
    Validation(String),

    /// Any other provider rejection, passed through verbatim.
    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    pub(crate) fn from_backend(err: BackendError) -> Self {
        match err {
            BackendError::Credentials(message) if message == INVALID_LOGIN_MESSAGE => {
                AuthError::InvalidCredentials
            }
            BackendError::Credentials(message) => AuthError::Provider(message),
            other => AuthError::Provider(other.to_string()),
        }
    }
}

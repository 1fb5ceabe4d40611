//! Common error types and handling for PIX Todo Dia

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for composition-level plumbing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

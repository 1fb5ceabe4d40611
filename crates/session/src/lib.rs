//! PIX Todo Dia session core
//!
//! Owns process-wide authentication state: resolves the current user's
//! profile and administrative role and exposes a consistent, race-free view
//! of "who is logged in and what can they do" to the rest of the
//! application. The view layer consumes [`AuthSnapshot`] through a watch
//! channel and gates routes with [`Gate`].

mod access;
mod client;
mod error;
mod snapshot;

pub use access::{AccessDecision, Gate};
pub use client::{SessionClient, SessionOptions, DEFAULT_CAPABILITY_TIMEOUT};
pub use error::AuthError;
pub use snapshot::AuthSnapshot;

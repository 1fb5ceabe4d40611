//! Shared configuration and error handling for the PIX Todo Dia platform core
//!
//! This crate provides the application-level configuration aggregate and the
//! error type used at the composition boundary. Individual service crates
//! load their own narrower configs from the same environment and carry their
//! own error enums.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};

//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use std::env;

use crate::error::{Error, Result};

#[derive(Clone)]
pub struct Config {
    /// Backend provider selection (http, mock)
    pub backend_provider: String,

    /// Hosted backend configuration
    pub platform_url: String,
    pub platform_anon_key: String,

    /// Base URL of the web application, used for email-confirmation redirects
    pub site_url: String,

    /// Combined budget for the profile + role fetch during session bootstrap
    pub bootstrap_timeout_ms: u64,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend_provider", &self.backend_provider)
            .field("platform_url", &self.platform_url)
            .field("platform_anon_key", &"[REDACTED]")
            .field("site_url", &self.site_url)
            .field("bootstrap_timeout_ms", &self.bootstrap_timeout_ms)
            .field("log_level", &self.log_level)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let backend_provider =
            env::var("BACKEND_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let platform_url = env::var("PLATFORM_URL").unwrap_or_default();
        let platform_anon_key = env::var("PLATFORM_ANON_KEY").unwrap_or_default();

        if backend_provider == "http" {
            if platform_url.is_empty() {
                return Err(Error::Configuration(
                    "PLATFORM_URL is required for http provider".to_string(),
                ));
            }
            if platform_anon_key.is_empty() {
                return Err(Error::Configuration(
                    "PLATFORM_ANON_KEY is required for http provider".to_string(),
                ));
            }
        }

        let config = Self {
            backend_provider,
            platform_url,
            platform_anon_key,

            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "https://pixtododia.app".to_string()),

            bootstrap_timeout_ms: env::var("BOOTSTRAP_TIMEOUT_MS")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .unwrap_or(4000),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "pixdia=debug".to_string()),
        };

        Ok(config)
    }
}

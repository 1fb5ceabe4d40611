//! PIX Todo Dia hosted backend client
//!
//! Typed client for the hosted identity-and-data backend that owns all
//! persistence and row-level authorization:
//! - HTTP implementation speaking the provider's auth and record-store APIs
//! - Programmable in-memory mock for testing and development
//! - Push-model auth-event stream (sign-in, sign-out, token refresh)

pub mod http;
pub mod mock;
pub mod types;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

pub use types::{
    AuthChange, AuthEvent, AuthUser, Profile, ProfileLevel, ProfilePatch, ProfileStatus, Session,
};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend configuration error: {0}")]
    Configuration(String),

    /// Credential rejection; carries the provider's message verbatim.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The cached session could not be restored or refreshed.
    #[error("Session error: {0}")]
    Session(String),

    #[error("Backend request error: {0}")]
    Request(String),

    #[error("Backend response error: {0}")]
    Response(String),
}

/// Backend client configuration.
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend provider (http, mock)
    pub provider: String,
    /// Base URL of the hosted backend project
    pub platform_url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
    /// Base URL of the web application, used as the email-confirmation redirect
    pub site_url: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("platform_url", &self.platform_url)
            .field("anon_key", &"[REDACTED]")
            .field("site_url", &self.site_url)
            .finish()
    }
}

impl BackendConfig {
    /// Create backend config from environment variables.
    pub fn from_env() -> Result<Self, BackendError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("BACKEND_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let platform_url = std::env::var("PLATFORM_URL").unwrap_or_default();
        let anon_key = std::env::var("PLATFORM_ANON_KEY").unwrap_or_default();
        let site_url = std::env::var("SITE_URL")
            .unwrap_or_else(|_| "https://pixtododia.app".to_string());

        if provider == "http" && (platform_url.is_empty() || anon_key.is_empty()) {
            return Err(BackendError::Configuration(
                "PLATFORM_URL and PLATFORM_ANON_KEY are required for http provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            platform_url,
            anon_key,
            site_url,
        })
    }
}

/// Credential and session operations exposed by the identity provider.
#[async_trait::async_trait]
pub trait IdentityApi: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// Create a new identity with a display name and confirmation redirect.
    /// Returns `None` when the provider requires email confirmation before
    /// the session exists.
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Option<Session>, BackendError>;

    /// Invalidate the current session with the provider.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Resolve the restored session, refreshing it when expired.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    /// Subscribe to the pushed auth-event stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

/// Generic record-store operations used by the platform.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the profile row for a user, if one exists.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError>;

    /// Write the populated fields of a partial profile update.
    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), BackendError>;

    /// Invoke the server-side role-check procedure for (user, role).
    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, BackendError>;
}

/// The full backend seam consumed by the session layer.
pub trait PlatformBackend: IdentityApi + RecordStore {}

impl<T: IdentityApi + RecordStore> PlatformBackend for T {}

/// Factory for creating PlatformBackend implementations.
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on configuration.
    pub fn create(config: BackendConfig) -> Result<Arc<dyn PlatformBackend>, BackendError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(url = %config.platform_url, "Creating HTTP backend client");
                if config.platform_url.is_empty() || config.anon_key.is_empty() {
                    return Err(BackendError::Configuration(
                        "PLATFORM_URL and PLATFORM_ANON_KEY are required for http provider"
                            .to_string(),
                    ));
                }
                Ok(Arc::new(http::HttpBackend::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock backend");
                Ok(Arc::new(mock::MockBackend::new()))
            }
            provider => Err(BackendError::Configuration(format!(
                "Unknown backend provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}

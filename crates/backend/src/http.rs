//! HTTP backend implementation
//!
//! Speaks the hosted provider's wire surface with reqwest: the auth API for
//! credential exchange and session lifecycle, the record-store API for
//! profile rows, and the `has_role` RPC for authorization checks.
//!
//! Auth-state changes are emitted client-locally on a broadcast channel,
//! mirroring the reference SDK: the client that performs a transition is the
//! one that announces it.

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{AuthChange, AuthEvent, AuthUser, Profile, ProfilePatch, Session};
use crate::{BackendConfig, BackendError, IdentityApi, RecordStore};

const EVENT_CHANNEL_CAPACITY: usize = 16;
const PROFILE_COLUMNS: &str = "name,level,progress,active_services,status";

/// Session payload returned by the token and signup endpoints.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: Uuid,
    email: Option<String>,
}

/// Error body shapes the auth API uses across versions.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            user: AuthUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_default(),
            },
        }
    }
}

/// Real HTTP client for the hosted backend.
pub struct HttpBackend {
    client: reqwest::Client,
    config: BackendConfig,
    session: std::sync::Mutex<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client: reqwest::Client::new(),
            config,
            session: std::sync::Mutex::new(None),
            events,
        }
    }

    /// Seed the client with a session persisted by the embedding application.
    pub fn with_persisted_session(self, session: Session) -> Self {
        self.store(Some(session));
        self
    }

    fn cached(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store(&self, session: Option<Session>) {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // No receivers is fine; the stream is optional for callers.
        let _ = self.events.send(AuthChange { event, session });
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.platform_url.trim_end_matches('/'), path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.config.platform_url.trim_end_matches('/'), path)
    }

    /// Bearer token for record-store calls: the session token when present,
    /// the anon key otherwise.
    fn bearer(&self) -> String {
        self.cached()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    /// Surface the provider's own message from an auth error body.
    async fn provider_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());

        if let Ok(parsed) = serde_json::from_str::<AuthErrorBody>(&body) {
            if let Some(message) = parsed
                .error_description
                .or(parsed.msg)
                .or(parsed.message)
            {
                return message;
            }
        }

        format!("Auth API returned {}: {}", status, body)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = Self::provider_message(response).await;
            return Err(BackendError::Session(format!(
                "token refresh rejected: {}",
                message
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;
        Ok(token.into_session())
    }
}

#[async_trait::async_trait]
impl IdentityApi for HttpBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        tracing::debug!(email = %email, "Signing in with password");

        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::provider_message(response).await;
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                return Err(BackendError::Credentials(message));
            }
            return Err(BackendError::Response(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;

        let session = token.into_session();
        self.store(Some(session.clone()));
        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<Option<Session>, BackendError> {
        tracing::debug!(email = %email, "Registering new account");

        let response = self
            .client
            .post(self.auth_url("signup"))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.config.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::provider_message(response).await;
            if status.is_client_error() {
                return Err(BackendError::Credentials(message));
            }
            return Err(BackendError::Response(message));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;

        // With confirmation enabled the endpoint returns a bare user object;
        // a session only appears when auto-confirm is on.
        if body.get("access_token").is_none() {
            tracing::debug!(email = %email, "Sign-up accepted, confirmation pending");
            return Ok(None);
        }

        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;
        let session = token.into_session();
        self.store(Some(session.clone()));
        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let session = self.cached();

        // Local invalidation first; the remote call is best effort.
        self.store(None);
        self.emit(AuthEvent::SignedOut, None);

        let Some(session) = session else {
            return Ok(());
        };

        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() && response.status() != StatusCode::UNAUTHORIZED {
            let message = Self::provider_message(response).await;
            return Err(BackendError::Response(message));
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let Some(session) = self.cached() else {
            self.emit(AuthEvent::InitialSession, None);
            return Ok(None);
        };

        if session.is_expired() {
            tracing::debug!("Cached session expired, refreshing");
            let refreshed = self.refresh(&session.refresh_token).await?;
            self.store(Some(refreshed.clone()));
            self.emit(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
            return Ok(Some(refreshed));
        }

        // Validate the cached token against the provider.
        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = Self::provider_message(response).await;
            return Err(BackendError::Session(format!(
                "cached session rejected: {}",
                message
            )));
        }

        self.emit(AuthEvent::InitialSession, Some(session.clone()));
        Ok(Some(session))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

#[async_trait::async_trait]
impl RecordStore for HttpBackend {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        let response = self
            .client
            .get(self.rest_url("profiles"))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", PROFILE_COLUMNS.to_string()),
            ])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(BackendError::Response(format!(
                "Record store returned {}: {}",
                status, body
            )));
        }

        let rows: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))?;
        Ok(rows.into_iter().next())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), BackendError> {
        if patch.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .patch(self.rest_url("profiles"))
            .query(&[("user_id", format!("eq.{}", user_id))])
            .header("apikey", &self.config.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
            .json(patch)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(BackendError::Response(format!(
                "Record store returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .post(self.rest_url("rpc/has_role"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer())
            .json(&json!({ "_user_id": user_id, "_role": role }))
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(BackendError::Response(format!(
                "Role check returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Response(format!("Failed to parse response: {}", e)))
    }
}

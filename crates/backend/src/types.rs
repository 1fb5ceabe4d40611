//! Wire types shared by the HTTP and mock backends
//!
//! These are lightweight views of rows owned by the hosted backend. The
//! application holds cached, possibly-stale copies; the backend is the
//! source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity attached to a session, as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// An authentication session: opaque tokens plus the identity they belong to.
///
/// Created on login/registration or when a persisted session is restored at
/// startup; destroyed on logout or when the provider invalidates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token has passed its expiry instant.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Coaching progression level stored on the profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileLevel {
    #[default]
    #[serde(rename = "iniciante")]
    Iniciante,
    #[serde(rename = "ativo")]
    Ativo,
    #[serde(rename = "consistente")]
    Consistente,
    #[serde(rename = "avançado")]
    Avancado,
}

impl std::fmt::Display for ProfileLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileLevel::Iniciante => write!(f, "iniciante"),
            ProfileLevel::Ativo => write!(f, "ativo"),
            ProfileLevel::Consistente => write!(f, "consistente"),
            ProfileLevel::Avancado => write!(f, "avançado"),
        }
    }
}

/// Account status, toggled by administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    #[default]
    Active,
    Blocked,
}

impl ProfileStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ProfileStatus::Active)
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileStatus::Active => write!(f, "active"),
            ProfileStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Profile row for a platform user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub level: ProfileLevel,
    pub progress: i32,
    pub active_services: Option<Vec<Uuid>>,
    pub status: ProfileStatus,
}

impl Profile {
    /// Merge a partial update into this profile, field by field.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(active_services) = &patch.active_services {
            self.active_services = Some(active_services.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial profile update; only the populated fields are written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<ProfileLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_services: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProfileStatus>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.level.is_none()
            && self.progress.is_none()
            && self.active_services.is_none()
            && self.status.is_none()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_level(mut self, level: ProfileLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_progress(mut self, progress: i32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_active_services(mut self, active_services: Vec<Uuid>) -> Self {
        self.active_services = Some(active_services);
        self
    }

    pub fn with_status(mut self, status: ProfileStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Kind of change carried on the pushed auth-event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl std::fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEvent::InitialSession => write!(f, "INITIAL_SESSION"),
            AuthEvent::SignedIn => write!(f, "SIGNED_IN"),
            AuthEvent::SignedOut => write!(f, "SIGNED_OUT"),
            AuthEvent::TokenRefreshed => write!(f, "TOKEN_REFRESHED"),
        }
    }
}

/// One notification on the auth-event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

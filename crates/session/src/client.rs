//! Session bootstrap and auth-state synchronization
//!
//! Two independent triggers race to establish the initial state: an explicit
//! session lookup and the backend's pushed auth-event stream (which also
//! fires once eagerly with the restored session). Both funnel into one
//! idempotent loading routine. An attempt token gives last-writer-wins by
//! start order, so a slow earlier attempt can never overwrite the result of
//! a later one, and a closed flag drops writes that resolve after teardown.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use pixdia_backend::{AuthUser, PlatformBackend, Profile, ProfilePatch};

use crate::error::AuthError;
use crate::snapshot::AuthSnapshot;

/// Combined budget for the profile fetch and role check during bootstrap.
pub const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(4);

const ADMIN_ROLE: &str = "admin";

/// Tunables for [`SessionClient`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub capability_timeout: Duration,
    /// Redirect target for the registration confirmation email.
    pub site_url: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            capability_timeout: DEFAULT_CAPABILITY_TIMEOUT,
            site_url: "https://pixtododia.app".to_string(),
        }
    }
}

#[derive(Validate)]
struct RegisterRequest {
    #[validate(length(min = 1, message = "Informe seu nome."))]
    name: String,
    #[validate(email(message = "E-mail inválido."))]
    email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres."))]
    password: String,
}

/// First localized message, checked in the order the form presents fields.
fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    for field in ["name", "email", "password"] {
        if let Some(list) = fields.get(field) {
            if let Some(message) = list.first().and_then(|e| e.message.as_ref()) {
                return message.to_string();
            }
        }
    }
    "Dados inválidos.".to_string()
}

/// Owns the published auth state and the backend subscription.
pub struct SessionClient {
    inner: Arc<Inner>,
    events_task: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    backend: Arc<dyn PlatformBackend>,
    state: watch::Sender<AuthSnapshot>,
    /// Monotonic bootstrap-attempt token; the highest token owns the state.
    attempt: AtomicU64,
    closed: AtomicBool,
    /// Serializes {closed check, attempt check, publish} against interleaved
    /// tasks.
    publish: Mutex<()>,
    capability_timeout: Duration,
    site_url: String,
}

impl SessionClient {
    pub fn new(backend: Arc<dyn PlatformBackend>) -> Self {
        Self::with_options(backend, SessionOptions::default())
    }

    pub fn with_options(backend: Arc<dyn PlatformBackend>, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                state,
                attempt: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                publish: Mutex::new(()),
                capability_timeout: options.capability_timeout,
                site_url: options.site_url,
            }),
            events_task: Mutex::new(None),
        }
    }

    /// Current snapshot; always available synchronously.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    /// Wait until the first bootstrap attempt has settled.
    pub async fn settled(&self) -> AuthSnapshot {
        let mut rx = self.inner.state.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if !snapshot.loading {
                return snapshot;
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Start the two bootstrap triggers: the event-stream subscription and
    /// the explicit session lookup.
    pub async fn bootstrap(&self) {
        let mut events = self.inner.backend.subscribe();
        let task_inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => {
                        tracing::debug!(event = %change.event, "auth event received");
                        let user = change.session.map(|s| s.user);
                        task_inner.apply_identity(user).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.events_task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);

        match self.inner.backend.current_session().await {
            Ok(session) => self.inner.apply_identity(session.map(|s| s.user)).await,
            Err(err) => {
                // Corrupt or expired local token: force a sign-out and clear
                // everything rather than staying stuck in loading.
                tracing::warn!(error = %err, "session restore failed, forcing sign-out");
                if let Err(err) = self.inner.backend.sign_out().await {
                    tracing::debug!(error = %err, "best-effort sign-out failed");
                }
                self.inner.clear_identity();
            }
        }
    }

    /// Credential authentication. On success the state refresh arrives
    /// through the auth-event stream; on failure state is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        match self.inner.backend.sign_in(email, password).await {
            Ok(_) => Ok(()),
            Err(err) => Err(AuthError::from_backend(err)),
        }
    }

    /// Create a new identity. Does not authenticate implicitly when the
    /// provider requires email confirmation.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        request
            .validate()
            .map_err(|errors| AuthError::Validation(first_message(&errors)))?;

        match self
            .inner
            .backend
            .sign_up(name, email, password, &self.inner.site_url)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => Err(AuthError::from_backend(err)),
        }
    }

    /// Invalidate the session. The remote call is best effort; local state
    /// always clears.
    pub async fn logout(&self) {
        if let Err(err) = self.inner.backend.sign_out().await {
            tracing::warn!(error = %err, "remote sign-out failed, clearing local state anyway");
        }
        self.inner.clear_identity();
    }

    /// Write profile fields remotely and merge them into the cached copy
    /// immediately. The optimistic merge is not rolled back on remote
    /// failure. No-op when unauthenticated.
    pub async fn update_profile(&self, patch: ProfilePatch) {
        let Some(user) = self.snapshot().user else {
            return;
        };
        if patch.is_empty() {
            return;
        }

        if let Err(err) = self.inner.backend.update_profile(user.id, &patch).await {
            tracing::warn!(error = %err, "remote profile update failed, keeping optimistic local copy");
        }

        let _guard = self.inner.publish.lock().unwrap_or_else(|e| e.into_inner());
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        self.inner.state.send_modify(|snapshot| {
            // Identity may have changed while the write was in flight.
            if snapshot.user.as_ref().map(|u| u.id) != Some(user.id) {
                return;
            }
            if let Some(profile) = snapshot.profile.as_mut() {
                profile.apply(&patch);
            }
        });
    }

    /// Re-fetch the profile for the current user, overwriting the cache on
    /// success. No-op when unauthenticated.
    pub async fn refresh_profile(&self) {
        let Some(user) = self.snapshot().user else {
            return;
        };

        match self.inner.backend.fetch_profile(user.id).await {
            Ok(Some(profile)) => {
                let _guard = self.inner.publish.lock().unwrap_or_else(|e| e.into_inner());
                if self.inner.closed.load(Ordering::SeqCst) {
                    return;
                }
                self.inner.state.send_modify(|snapshot| {
                    if snapshot.user.as_ref().map(|u| u.id) == Some(user.id) {
                        snapshot.profile = Some(profile);
                    }
                });
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "profile refresh failed, keeping cached copy");
            }
        }
    }

    /// Tear down: release the event subscription and suppress any state
    /// writes still in flight.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        if let Some(handle) = self
            .events_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.close();
    }
}

impl Inner {
    /// The single idempotent state-loading routine both triggers funnel
    /// into, parameterized by "the session's user, or none".
    async fn apply_identity(&self, user: Option<AuthUser>) {
        let token = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;

        let (profile, is_admin) = match &user {
            Some(user) => self.load_capabilities(user.id).await,
            None => (None, false),
        };

        self.publish_attempt(
            token,
            AuthSnapshot {
                user,
                profile,
                is_admin,
                loading: false,
            },
        );
    }

    /// Fetch profile and role concurrently under the combined timeout,
    /// degrading each failure to its default.
    async fn load_capabilities(&self, user_id: Uuid) -> (Option<Profile>, bool) {
        let fetches = async {
            tokio::join!(
                self.backend.fetch_profile(user_id),
                self.backend.has_role(user_id, ADMIN_ROLE),
            )
        };

        match tokio::time::timeout(self.capability_timeout, fetches).await {
            Ok((profile, role)) => {
                let profile = match profile {
                    Ok(profile) => profile,
                    Err(err) => {
                        tracing::warn!(error = %err, "profile fetch failed, continuing without profile");
                        None
                    }
                };
                let is_admin = match role {
                    Ok(is_admin) => is_admin,
                    Err(err) => {
                        tracing::warn!(error = %err, "role check failed, assuming non-admin");
                        false
                    }
                };
                (profile, is_admin)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.capability_timeout.as_millis() as u64,
                    "profile and role fetch timed out, continuing with defaults"
                );
                (None, false)
            }
        }
    }

    /// Publish iff this attempt is still the latest and the client is alive.
    fn publish_attempt(&self, token: u64, snapshot: AuthSnapshot) {
        let _guard = self.publish.lock().unwrap_or_else(|e| e.into_inner());
        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!(token, "dropping state write after teardown");
            return;
        }
        if self.attempt.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "dropping superseded bootstrap attempt");
            return;
        }
        self.state.send_replace(snapshot);
    }

    /// Immediate cleared publication that also invalidates any in-flight
    /// attempt.
    fn clear_identity(&self) {
        let token = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish_attempt(token, AuthSnapshot::signed_out());
    }
}

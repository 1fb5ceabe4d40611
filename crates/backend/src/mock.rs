//! Mock backend implementation
//!
//! In-memory users, profiles, and role grants with programmable per-operation
//! behavior (delays and outcomes), plus an externally drivable auth-event
//! stream for simulating provider-initiated changes such as cross-tab
//! sign-outs. Thread-safe via `Mutex`/`RwLock`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{AuthChange, AuthEvent, AuthUser, Profile, ProfilePatch, Session};
use crate::{BackendError, IdentityApi, RecordStore};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Operations whose behavior can be programmed individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    SignIn,
    SignUp,
    SignOut,
    CurrentSession,
    FetchProfile,
    UpdateProfile,
    HasRole,
}

impl std::fmt::Display for MockOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MockOp::SignIn => "sign_in",
            MockOp::SignUp => "sign_up",
            MockOp::SignOut => "sign_out",
            MockOp::CurrentSession => "current_session",
            MockOp::FetchProfile => "fetch_profile",
            MockOp::UpdateProfile => "update_profile",
            MockOp::HasRole => "has_role",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a programmed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockOutcome {
    #[default]
    Succeed,
    /// Resolve with a backend error after the configured delay.
    Fail,
    /// Never resolve within any reasonable test window.
    Hang,
}

#[derive(Debug, Clone, Copy, Default)]
struct OpSettings {
    delay_ms: u64,
    outcome: MockOutcome,
}

/// Programmable behavior for mock operations.
#[derive(Debug, Default)]
pub struct MockBehavior {
    settings: RwLock<HashMap<MockOp, OpSettings>>,
}

impl MockBehavior {
    pub fn set_delay_ms(&self, op: MockOp, delay_ms: u64) {
        self.settings
            .write()
            .expect("behavior lock poisoned — prior test panicked")
            .entry(op)
            .or_default()
            .delay_ms = delay_ms;
    }

    pub fn set_outcome(&self, op: MockOp, outcome: MockOutcome) {
        self.settings
            .write()
            .expect("behavior lock poisoned — prior test panicked")
            .entry(op)
            .or_default()
            .outcome = outcome;
    }

    pub fn reset(&self) {
        self.settings
            .write()
            .expect("behavior lock poisoned — prior test panicked")
            .clear();
    }

    fn get(&self, op: MockOp) -> OpSettings {
        self.settings
            .read()
            .expect("behavior lock poisoned — prior test panicked")
            .get(&op)
            .copied()
            .unwrap_or_default()
    }
}

struct MockUser {
    user: AuthUser,
    password: String,
}

/// Mock backend that serves everything from memory.
pub struct MockBackend {
    users: Mutex<HashMap<String, MockUser>>,
    profiles: Mutex<HashMap<Uuid, Profile>>,
    admins: Mutex<HashSet<Uuid>>,
    session: Mutex<Option<Session>>,
    confirmation_required: AtomicBool,
    behavior: MockBehavior,
    events: broadcast::Sender<AuthChange>,
    calls: Mutex<Vec<MockOp>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            users: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            admins: Mutex::new(HashSet::new()),
            session: Mutex::new(None),
            confirmation_required: AtomicBool::new(false),
            behavior: MockBehavior::default(),
            events,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create an account with its default profile row, as the backend's
    /// sign-up trigger would.
    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.users.lock().unwrap().insert(
            email.to_string(),
            MockUser {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        self.profiles.lock().unwrap().insert(
            user.id,
            Profile {
                name: name.to_string(),
                ..Profile::default()
            },
        );
        user
    }

    pub fn set_profile(&self, user_id: Uuid, profile: Profile) {
        self.profiles.lock().unwrap().insert(user_id, profile);
    }

    pub fn grant_admin(&self, user_id: Uuid) {
        self.admins.lock().unwrap().insert(user_id);
    }

    /// When set, `sign_up` leaves the account unconfirmed and returns no
    /// session.
    pub fn require_confirmation(&self, required: bool) {
        self.confirmation_required.store(required, Ordering::SeqCst);
    }

    /// Place a live session in the store, as if persisted by a prior run.
    pub fn restore_session_for(&self, email: &str) -> Session {
        let session = self.make_session(email);
        *self.session.lock().unwrap() = Some(session.clone());
        session
    }

    /// Build a session for a seeded user without storing it.
    pub fn make_session(&self, email: &str) -> Session {
        let users = self.users.lock().unwrap();
        let entry = users.get(email).expect("unknown mock user");
        Session {
            access_token: format!("mock-access-{}", Uuid::new_v4()),
            refresh_token: format!("mock-refresh-{}", Uuid::new_v4()),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user: entry.user.clone(),
        }
    }

    /// Push an auth change as if the provider initiated it (cross-tab
    /// sign-out, token refresh).
    pub fn push_change(&self, event: AuthEvent, session: Option<Session>) {
        *self.session.lock().unwrap() = session.clone();
        let _ = self.events.send(AuthChange { event, session });
    }

    pub fn behavior(&self) -> &MockBehavior {
        &self.behavior
    }

    pub fn recorded_calls(&self) -> Vec<MockOp> {
        self.calls.lock().unwrap().clone()
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        let _ = self.events.send(AuthChange { event, session });
    }

    /// Apply the programmed delay and outcome for an operation.
    async fn gate(&self, op: MockOp) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(op);
        let settings = self.behavior.get(op);

        if settings.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(settings.delay_ms)).await;
        }

        match settings.outcome {
            MockOutcome::Succeed => Ok(()),
            MockOutcome::Fail => match op {
                MockOp::CurrentSession => {
                    Err(BackendError::Session(format!("mock {} rejected", op)))
                }
                _ => Err(BackendError::Request(format!("mock {} failure", op))),
            },
            MockOutcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(BackendError::Request(format!("mock {} hang elapsed", op)))
            }
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IdentityApi for MockBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.gate(MockOp::SignIn).await?;

        let matched = {
            let users = self.users.lock().unwrap();
            users
                .get(email)
                .map(|entry| entry.password == password)
                .unwrap_or(false)
        };
        if !matched {
            return Err(BackendError::Credentials(
                "Invalid login credentials".to_string(),
            ));
        }

        let session = self.make_session(email);
        *self.session.lock().unwrap() = Some(session.clone());
        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        _redirect_to: &str,
    ) -> Result<Option<Session>, BackendError> {
        self.gate(MockOp::SignUp).await?;

        if self.users.lock().unwrap().contains_key(email) {
            return Err(BackendError::Credentials(
                "User already registered".to_string(),
            ));
        }

        self.seed_user(name, email, password);

        if self.confirmation_required.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let session = self.make_session(email);
        *self.session.lock().unwrap() = Some(session.clone());
        self.emit(AuthEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.gate(MockOp::SignOut).await?;
        *self.session.lock().unwrap() = None;
        self.emit(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        self.gate(MockOp::CurrentSession).await?;
        let session = self.session.lock().unwrap().clone();
        self.emit(AuthEvent::InitialSession, session.clone());
        Ok(session)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}

#[async_trait::async_trait]
impl RecordStore for MockBackend {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.gate(MockOp::FetchProfile).await?;
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), BackendError> {
        self.gate(MockOp::UpdateProfile).await?;
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(&user_id) {
            profile.apply(patch);
        }
        Ok(())
    }

    async fn has_role(&self, user_id: Uuid, role: &str) -> Result<bool, BackendError> {
        self.gate(MockOp::HasRole).await?;
        Ok(role == "admin" && self.admins.lock().unwrap().contains(&user_id))
    }
}

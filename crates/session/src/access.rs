//! Route-guard decisions derived from the published snapshot
//!
//! Guards must not redirect while the snapshot is still resolving: a
//! `Pending` decision means "render nothing / show a neutral spinner".

use crate::snapshot::AuthSnapshot;

/// What a route guard should do with the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Bootstrap has not settled; render nothing yet.
    Pending,
    /// Redirect to login (or dashboard, for admin-only routes).
    Denied,
    Granted,
}

/// Requirement a protected route places on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    SignedIn,
    Admin,
}

impl Gate {
    pub fn evaluate(&self, snapshot: &AuthSnapshot) -> AccessDecision {
        if snapshot.loading {
            return AccessDecision::Pending;
        }
        if !snapshot.is_authenticated() {
            return AccessDecision::Denied;
        }
        match self {
            Gate::SignedIn => AccessDecision::Granted,
            Gate::Admin if snapshot.is_admin => AccessDecision::Granted,
            Gate::Admin => AccessDecision::Denied,
        }
    }
}

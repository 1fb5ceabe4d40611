//! The published authentication snapshot
//!
//! At any instant dependent views observe exactly one of three states:
//! unauthenticated, authenticating (`loading`), or authenticated with
//! profile and role resolved (either may be defaulted after a fetch
//! failure).

use pixdia_backend::{AuthUser, Profile};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<AuthUser>,
    pub profile: Option<Profile>,
    pub is_admin: bool,
    /// True until the first bootstrap attempt settles.
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The cleared, settled state published after logout or forced sign-out.
    pub(crate) fn signed_out() -> Self {
        Self {
            user: None,
            profile: None,
            is_admin: false,
            loading: false,
        }
    }
}

impl Default for AuthSnapshot {
    /// The authenticating state views see before bootstrap settles.
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            is_admin: false,
            loading: true,
        }
    }
}

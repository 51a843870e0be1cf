//! Authenticated caller of an engine operation.

use inkwell_shared::types::UserId;
use inkwell_shared::{CallerRole, Claims};

use crate::ledger::LedgerError;

/// Who is calling, as established by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller's user id.
    pub user_id: UserId,
    /// Caller's role.
    pub role: CallerRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: CallerRole) -> Self {
        Self { user_id, role }
    }

    /// A regular reader.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self::new(user_id, CallerRole::User)
    }

    /// An operator.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self::new(user_id, CallerRole::Admin)
    }

    /// Rejects callers without the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AdminRequired` for regular users.
    pub const fn require_admin(&self) -> Result<(), LedgerError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(LedgerError::AdminRequired(self.user_id))
        }
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self::new(UserId::from_uuid(claims.user_id()), claims.role)
    }
}

//! Authenticated session as issued by the external auth service.

use serde::{Deserialize, Serialize};

/// Dashboard role of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator, sees every gym
    Admin,
    /// Owner of one gym
    GymOwner,
    /// Trainer at one gym
    Trainer,
    /// Member of one gym
    Member,
}

/// Bearer token plus the tenant it is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Bearer token sent with every request
    pub token: String,
    /// Role the dashboards are scoped to
    pub role: Role,
    /// Gym the user belongs to; absent for admins
    #[serde(default)]
    pub gym_id: Option<String>,
}

impl AuthSession {
    /// Gym every list should be pinned to, `None` for platform-wide sessions.
    ///
    /// This is a convenience for the UI, not an access control: the backend
    /// enforces tenancy on its own.
    #[must_use]
    pub fn tenant_scope(&self) -> Option<&str> {
        match self.role {
            Role::Admin => None,
            Role::GymOwner | Role::Trainer | Role::Member => self.gym_id.as_deref(),
        }
    }
}

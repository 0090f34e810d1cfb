//! User model - accounts owned by exactly one tenant.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity (tenant-scoped).
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC string.
    pub pass_hash: String,
    pub is_admin: bool,
    pub tenant_id: Uuid,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Create a new non-admin user.
    pub fn new(email: String, pass_hash: String, tenant_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            pass_hash,
            is_admin: false,
            tenant_id,
            created_utc: Utc::now(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("is_admin", &self.is_admin)
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

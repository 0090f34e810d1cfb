//! Tenant model - an app whose users share one signing secret.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant entity.
///
/// `secret` is the HS256 key for every token issued to this tenant's users.
/// It is never serialized back to callers.
#[derive(Clone, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub secret: String,
    pub created_utc: DateTime<Utc>,
}

impl Tenant {
    /// Create a new tenant with a fresh identifier.
    pub fn new(name: String, secret: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            secret,
            created_utc: Utc::now(),
        }
    }
}

impl std::fmt::Debug for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenant")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let tenant = Tenant::new("acme".to_string(), "s3cr3t".to_string());
        let rendered = format!("{:?}", tenant);
        assert!(rendered.contains("acme"));
        assert!(!rendered.contains("s3cr3t"));
    }
}

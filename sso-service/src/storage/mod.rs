//! Persistence ports consumed by the credential service.
//!
//! The service only sees these narrow traits. Uniqueness of user emails and
//! tenant names is enforced by the backend and reported through
//! [`StorageError`]; callers never check-then-insert.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::{run_migrations, PgStorage};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Tenant, User};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("tenant already exists")]
    TenantExists,

    #[error("tenant not found")]
    TenantNotFound,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Persist a new user. Fails with `UserExists` on a duplicate email and
    /// `TenantNotFound` when `tenant_id` references no tenant.
    async fn save_user(
        &self,
        email: &str,
        pass_hash: &str,
        tenant_id: Uuid,
    ) -> Result<Uuid, StorageError>;
}

#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<User, StorageError>;

    async fn is_admin_flag(&self, user_id: Uuid) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait TenantSaver: Send + Sync {
    /// Persist a new tenant. Fails with `TenantExists` on a duplicate name.
    async fn save_tenant(&self, name: &str, secret: &str) -> Result<Uuid, StorageError>;
}

#[async_trait]
pub trait TenantProvider: Send + Sync {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Tenant, StorageError>;
}

/// Convenience bound for backends that implement every port.
pub trait Storage: UserSaver + UserProvider + TenantSaver + TenantProvider {}

impl<T> Storage for T where T: UserSaver + UserProvider + TenantSaver + TenantProvider {}

//! In-memory storage backend for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{StorageError, TenantProvider, TenantSaver, UserProvider, UserSaver};
use crate::models::{Tenant, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    users_by_email: HashMap<String, Uuid>,
    tenants: HashMap<Uuid, Tenant>,
    tenants_by_name: HashMap<String, Uuid>,
}

/// Mutex-guarded maps mirroring the relational schema's constraints:
/// unique email, unique tenant name, user → tenant foreign key.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Other(anyhow::anyhow!("Memory storage mutex poisoned: {}", e)))
    }

    /// Grant or revoke the administrator flag. There is no RPC for this; it
    /// stands in for an operator editing the database.
    pub fn set_admin(&self, user_id: Uuid, is_admin: bool) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StorageError::UserNotFound)?;
        user.is_admin = is_admin;
        Ok(())
    }
}

#[async_trait]
impl UserSaver for MemoryStorage {
    async fn save_user(
        &self,
        email: &str,
        pass_hash: &str,
        tenant_id: Uuid,
    ) -> Result<Uuid, StorageError> {
        let mut tables = self.lock()?;

        if tables.users_by_email.contains_key(email) {
            return Err(StorageError::UserExists);
        }
        if !tables.tenants.contains_key(&tenant_id) {
            return Err(StorageError::TenantNotFound);
        }

        let user = User::new(email.to_string(), pass_hash.to_string(), tenant_id);
        let user_id = user.id;
        tables.users_by_email.insert(email.to_string(), user_id);
        tables.users.insert(user_id, user);

        Ok(user_id)
    }
}

#[async_trait]
impl UserProvider for MemoryStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<User, StorageError> {
        let tables = self.lock()?;
        tables
            .users_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin_flag(&self, user_id: Uuid) -> Result<bool, StorageError> {
        let tables = self.lock()?;
        tables
            .users
            .get(&user_id)
            .map(|user| user.is_admin)
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl TenantSaver for MemoryStorage {
    async fn save_tenant(&self, name: &str, secret: &str) -> Result<Uuid, StorageError> {
        let mut tables = self.lock()?;

        if tables.tenants_by_name.contains_key(name) {
            return Err(StorageError::TenantExists);
        }

        let tenant = Tenant::new(name.to_string(), secret.to_string());
        let tenant_id = tenant.id;
        tables.tenants_by_name.insert(name.to_string(), tenant_id);
        tables.tenants.insert(tenant_id, tenant);

        Ok(tenant_id)
    }
}

#[async_trait]
impl TenantProvider for MemoryStorage {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Tenant, StorageError> {
        let tables = self.lock()?;
        tables
            .tenants
            .get(&tenant_id)
            .cloned()
            .ok_or(StorageError::TenantNotFound)
    }
}

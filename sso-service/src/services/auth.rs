//! Credential service: login, registration, admin check, tenant registration.

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use super::error::AuthError;
use super::jwt::TokenIssuer;
use crate::storage::{
    Storage, StorageError, TenantProvider, TenantSaver, UserProvider, UserSaver,
};
use crate::utils::{
    hash_password, verify_against_dummy, verify_password, Password, PasswordHashString,
};

/// Orchestrates the persistence ports and the token issuer.
///
/// Stateless apart from its collaborators, so one instance is shared by every
/// transport and every in-flight call.
#[derive(Clone)]
pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    tenant_saver: Arc<dyn TenantSaver>,
    tenant_provider: Arc<dyn TenantProvider>,
    issuer: TokenIssuer,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        tenant_saver: Arc<dyn TenantSaver>,
        tenant_provider: Arc<dyn TenantProvider>,
        issuer: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            tenant_saver,
            tenant_provider,
            issuer,
            token_ttl,
        }
    }

    /// Wire every port to the same backend.
    pub fn with_storage<S>(storage: Arc<S>, issuer: TokenIssuer, token_ttl: Duration) -> Self
    where
        S: Storage + 'static,
    {
        Self::new(
            storage.clone(),
            storage.clone(),
            storage.clone(),
            storage,
            issuer,
            token_ttl,
        )
    }

    /// Verify credentials and issue a token signed with the tenant's secret.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(
        &self,
        email: &str,
        password: Password,
        tenant_id: Uuid,
    ) -> Result<String, AuthError> {
        const OP: &str = "services.auth.login";

        tracing::info!(op = OP, tenant_id = %tenant_id, "Logging in user");

        let user = match self.user_provider.find_user_by_email(email).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound) => {
                tracing::warn!(op = OP, "User not found");
                // Pay the argon2 cost anyway; the outcome is discarded
                let _ = tokio::task::spawn_blocking(move || verify_against_dummy(&password)).await;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to load user");
                return Err(internal(OP, e));
            }
        };

        let stored_hash = PasswordHashString::new(user.pass_hash.clone());
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| internal(OP, e))?
            .map_err(|e| {
                tracing::error!(op = OP, user_id = %user.id, error = %e, "Stored password hash is unusable");
                internal(OP, e)
            })?;

        if !matches {
            tracing::info!(op = OP, user_id = %user.id, "Invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let tenant = match self.tenant_provider.find_tenant_by_id(tenant_id).await {
            Ok(tenant) => tenant,
            Err(StorageError::TenantNotFound) => {
                tracing::warn!(op = OP, tenant_id = %tenant_id, "Invalid tenant id");
                return Err(AuthError::InvalidTenant);
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to load tenant");
                return Err(internal(OP, e));
            }
        };

        let token = self
            .issuer
            .issue(&user, &tenant, self.token_ttl)
            .map_err(|e| {
                tracing::error!(op = OP, error = %e, "Failed to generate token");
                internal(OP, e)
            })?;

        tracing::info!(op = OP, user_id = %user.id, tenant_id = %tenant.id, "User logged in");

        Ok(token)
    }

    /// Hash the password and persist a new user in `tenant_id`.
    pub async fn register_user(
        &self,
        email: &str,
        password: Password,
        tenant_id: Uuid,
    ) -> Result<Uuid, AuthError> {
        const OP: &str = "services.auth.register_user";

        tracing::info!(op = OP, tenant_id = %tenant_id, "Registering user");

        let pass_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| internal(OP, e))?
            .map_err(|e| {
                tracing::error!(op = OP, error = %e, "Failed to generate password hash");
                internal(OP, e)
            })?;

        let user_id = match self
            .user_saver
            .save_user(email, pass_hash.as_str(), tenant_id)
            .await
        {
            Ok(id) => id,
            Err(StorageError::UserExists) => {
                tracing::warn!(op = OP, "User already exists");
                return Err(AuthError::UserExists);
            }
            Err(StorageError::TenantNotFound) => {
                tracing::warn!(op = OP, tenant_id = %tenant_id, "Invalid tenant id");
                return Err(AuthError::InvalidTenant);
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to save user");
                return Err(internal(OP, e));
            }
        };

        tracing::info!(op = OP, user_id = %user_id, "User registered");

        Ok(user_id)
    }

    pub async fn is_admin(&self, user_id: Uuid) -> Result<bool, AuthError> {
        const OP: &str = "services.auth.is_admin";

        tracing::info!(op = OP, user_id = %user_id, "Checking if user is admin");

        let is_admin = match self.user_provider.is_admin_flag(user_id).await {
            Ok(flag) => flag,
            Err(StorageError::UserNotFound) => return Err(AuthError::UserNotFound),
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to read admin flag");
                return Err(internal(OP, e));
            }
        };

        tracing::info!(op = OP, user_id = %user_id, is_admin, "Checked if user is admin");

        Ok(is_admin)
    }

    /// Persist a tenant. The secret is stored as given and becomes the
    /// signing key for all of the tenant's tokens.
    pub async fn register_tenant(&self, name: &str, secret: &str) -> Result<Uuid, AuthError> {
        const OP: &str = "services.auth.register_tenant";

        tracing::info!(op = OP, name = %name, "Registering tenant");

        let tenant_id = match self.tenant_saver.save_tenant(name, secret).await {
            Ok(id) => id,
            Err(StorageError::TenantExists) => {
                tracing::warn!(op = OP, name = %name, "Tenant already exists");
                return Err(AuthError::TenantExists);
            }
            Err(e) => {
                tracing::error!(op = OP, error = %e, "Failed to save tenant");
                return Err(internal(OP, e));
            }
        };

        tracing::info!(op = OP, tenant_id = %tenant_id, "Tenant registered");

        Ok(tenant_id)
    }
}

fn internal<E>(op: &'static str, err: E) -> AuthError
where
    E: std::fmt::Display,
{
    AuthError::Internal(anyhow::anyhow!("{}: {}", op, err))
}

//! PostgreSQL storage backend.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{StorageError, TenantProvider, TenantSaver, UserProvider, UserSaver};
use crate::config::DatabaseConfig;
use crate::models::{Tenant, User};

const UNIQUE_USERS_EMAIL: &str = "uni_users_email";
const UNIQUE_TENANTS_NAME: &str = "uni_tenants_name";
const FK_USERS_TENANT: &str = "fk_users_tenant";

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Open a connection pool.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        tracing::info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.url)
            .await?;

        tracing::info!("Successfully connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

/// Name of the constraint a database error tripped, if it was a constraint error.
fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
        {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    }
}

fn other(op: &'static str, err: sqlx::Error) -> StorageError {
    StorageError::Other(anyhow::anyhow!("{}: {}", op, err))
}

#[async_trait]
impl UserSaver for PgStorage {
    async fn save_user(
        &self,
        email: &str,
        pass_hash: &str,
        tenant_id: Uuid,
    ) -> Result<Uuid, StorageError> {
        const OP: &str = "storage.postgres.save_user";

        let user_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, pass_hash, is_admin, tenant_id, created_utc)
            VALUES ($1, $2, $3, FALSE, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(pass_hash)
        .bind(tenant_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some(UNIQUE_USERS_EMAIL) => StorageError::UserExists,
            Some(FK_USERS_TENANT) => StorageError::TenantNotFound,
            _ => other(OP, e),
        })?;

        Ok(user_id)
    }
}

#[async_trait]
impl UserProvider for PgStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| other("storage.postgres.find_user_by_email", e))?
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin_flag(&self, user_id: Uuid) -> Result<bool, StorageError> {
        sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| other("storage.postgres.is_admin_flag", e))?
            .ok_or(StorageError::UserNotFound)
    }
}

#[async_trait]
impl TenantSaver for PgStorage {
    async fn save_tenant(&self, name: &str, secret: &str) -> Result<Uuid, StorageError> {
        const OP: &str = "storage.postgres.save_tenant";

        let tenant_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, secret, created_utc)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(secret)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some(UNIQUE_TENANTS_NAME) => StorageError::TenantExists,
            _ => other(OP, e),
        })?;

        Ok(tenant_id)
    }
}

#[async_trait]
impl TenantProvider for PgStorage {
    async fn find_tenant_by_id(&self, tenant_id: Uuid) -> Result<Tenant, StorageError> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| other("storage.postgres.find_tenant_by_id", e))?
            .ok_or(StorageError::TenantNotFound)
    }
}

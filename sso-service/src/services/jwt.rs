use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Tenant, User};

/// Time source for token timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID
    pub uid: Uuid,
    /// Email
    pub email: String,
    /// Tenant ID
    pub tenant: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Mints HS256 tokens signed with the owning tenant's secret.
///
/// Holds no keys of its own: a token can only be verified by whoever knows
/// that tenant's secret.
#[derive(Clone)]
pub struct TokenIssuer {
    clock: Arc<dyn Clock>,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TokenIssuer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Issue a token for `user` within `tenant`, valid for `ttl`.
    ///
    /// Fails when `now + ttl` falls outside the representable date range.
    pub fn issue(&self, user: &User, tenant: &Tenant, ttl: Duration) -> Result<String, anyhow::Error> {
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow::anyhow!("Token expiry overflows: ttl of {}s", ttl.num_seconds()))?;

        let claims = TokenClaims {
            uid: user.id,
            email: user.email.clone(),
            tenant: tenant.id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &EncodingKey::from_secret(tenant.secret.as_bytes()))
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))?;

        Ok(token)
    }
}

/// Verify a token's signature and expiry against a tenant secret.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims, anyhow::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat"]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

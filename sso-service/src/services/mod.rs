pub mod auth;
pub mod error;
pub mod jwt;

pub use auth::AuthService;
pub use error::AuthError;
pub use jwt::{decode_token, Clock, SystemClock, TokenClaims, TokenIssuer};

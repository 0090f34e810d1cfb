//! Domain records persisted by the storage layer.

mod tenant;
mod user;

pub use tenant::Tenant;
pub use user::User;

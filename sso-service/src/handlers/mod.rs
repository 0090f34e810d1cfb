//! HTTP/JSON gateway handlers.
//!
//! Each operation has an `*_impl` function taking an already validated
//! request; the gRPC service calls the same functions.

pub mod auth;
pub mod tenant;

pub use auth::*;
pub use tenant::*;

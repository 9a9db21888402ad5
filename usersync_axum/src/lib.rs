//! usersync_axum - Axum endpoint layer for the usersync library
//!
//! Exposes the user synchronization endpoints (`POST /login`, `GET /me`,
//! `GET /health`) behind the uniform response envelope, plus the bearer-token
//! identity middleware that feeds them.

mod error;
mod identity;
mod response;
mod user;

pub use identity::{AuthIdentity, IdentityConfigError, TokenVerifier, authenticate};
pub use response::ApiResponse;
pub use user::{LoginRequest, router};

// Re-export the pieces integrations need from the core crate
pub use usersync::{Identity, USERSYNC_ROUTE_PREFIX, User};

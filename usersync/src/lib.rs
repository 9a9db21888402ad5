//! usersync - Login-time user synchronization library
//!
//! This crate keeps a relational user store in sync with an external identity
//! provider: the first authenticated login creates the user row, subsequent
//! logins refresh it. The coordination layer exposes the login upsert and the
//! user management operations; the storage layer speaks SQLite or PostgreSQL
//! through sqlx.

mod config;
mod coordination;
mod storage;
mod userdb;

#[cfg(test)]
mod test_utils;

pub use coordination::{
    CoordinationError, Identity, add_or_update_user, delete_user_account, get_user,
    get_user_by_email, get_user_by_external_id, list_users, list_users_by_tenant, login_user,
    user_from_identity,
};

pub use userdb::{DeleteOutcome, User, UserError, UserStore};

// Re-export the route prefix for HTTP integrations
pub use config::USERSYNC_ROUTE_PREFIX;

/// Initialize the user synchronization layer
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    userdb::init().await?;
    Ok(())
}

//! User synchronization coordination module
//!
//! High-level operations that sit between the HTTP layer and the user store.
//! This is the main entry point for the login upsert and for user management.
//!
//! The module is divided into several submodules:
//! - `errors`: Error types specific to coordination operations
//! - `login`: The login-time find-or-create flow
//! - `user`: User management operations and identity materialization

mod errors;
mod login;
mod user;

pub use errors::CoordinationError;
pub use login::login_user;
pub use user::{
    Identity, add_or_update_user, delete_user_account, get_user, get_user_by_email,
    get_user_by_external_id, list_users, list_users_by_tenant, user_from_identity,
};

//! Central configuration for the usersync crate

use std::sync::LazyLock;

/// Route prefix for all usersync endpoints
///
/// This is the prefix under which HTTP integrations mount the user endpoints.
/// Default: "/api/user"
pub static USERSYNC_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("USERSYNC_ROUTE_PREFIX").unwrap_or_else(|_| "/api/user".to_string())
});

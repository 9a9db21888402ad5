use serde::{Deserialize, Serialize};

use crate::userdb::{DeleteOutcome, User, UserStore};

use super::errors::CoordinationError;

/// Identity claims extracted from an authenticated request
///
/// The HTTP layer resolves these once from the validated bearer token and
/// passes them in explicitly; nothing below the endpoint layer reads ambient
/// request state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub external_user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
}

/// Materialize a transient user from identity claims
///
/// The result is never persisted here; it carries the sentinel id.
pub fn user_from_identity(identity: &Identity) -> User {
    User::new(
        identity.external_user_id.clone(),
        identity.email.clone(),
        identity.name.clone(),
        identity.tenant_id.clone(),
    )
}

/// Add a new user or update an existing one, keyed by the id sentinel
pub async fn add_or_update_user(user: User) -> Result<User, CoordinationError> {
    let stored = if user.is_persisted() {
        UserStore::update_user(user).await?
    } else {
        UserStore::add_user(user).await?
    };
    Ok(stored)
}

/// Get a user by id
pub async fn get_user(id: i64) -> Result<User, CoordinationError> {
    UserStore::find_user(id).await?.ok_or_else(|| {
        CoordinationError::ResourceNotFound {
            resource_type: "User".to_string(),
            resource_id: id.to_string(),
        }
        .log()
    })
}

/// Find a user by email; absent is `None`
pub async fn get_user_by_email(email: &str) -> Result<Option<User>, CoordinationError> {
    Ok(UserStore::find_by_email(email).await?)
}

/// Find a user by the identity provider's subject id; absent is `None`
pub async fn get_user_by_external_id(
    external_user_id: &str,
) -> Result<Option<User>, CoordinationError> {
    Ok(UserStore::find_by_external_user_id(external_user_id).await?)
}

/// List all users
pub async fn list_users() -> Result<Vec<User>, CoordinationError> {
    Ok(UserStore::get_all_users().await?)
}

/// List users belonging to a tenant
pub async fn list_users_by_tenant(tenant_id: &str) -> Result<Vec<User>, CoordinationError> {
    Ok(UserStore::get_users_by_tenant(tenant_id).await?)
}

/// Delete a user account
///
/// Administrative operation, distinct from the login path. Idempotent: a
/// missing row reports [`DeleteOutcome::NotFound`] rather than failing.
pub async fn delete_user_account(id: i64) -> Result<DeleteOutcome, CoordinationError> {
    let outcome = UserStore::delete_user(id).await?;
    tracing::debug!("Delete user {}: {}", id, outcome.message());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;
    use serial_test::serial;

    fn identity() -> Identity {
        Identity {
            external_user_id: Some("ext-me".to_string()),
            email: Some("me@example.com".to_string()),
            name: Some("Me Myself".to_string()),
            tenant_id: Some("tenant-me".to_string()),
        }
    }

    /// Claims map onto a transient user without any store access
    #[test]
    fn test_user_from_identity() {
        let user = user_from_identity(&identity());

        assert_eq!(user.id, User::UNPERSISTED);
        assert_eq!(user.external_user_id.as_deref(), Some("ext-me"));
        assert_eq!(user.email.as_deref(), Some("me@example.com"));
        assert_eq!(user.name.as_deref(), Some("Me Myself"));
        assert_eq!(user.tenant_id.as_deref(), Some("tenant-me"));
    }

    #[test]
    fn test_user_from_identity_with_missing_claims() {
        let user = user_from_identity(&Identity::default());

        assert_eq!(user.id, User::UNPERSISTED);
        assert!(user.external_user_id.is_none());
        assert!(user.email.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_add_or_update_dispatches_on_sentinel() {
        init_test_environment().await;

        let added = add_or_update_user(User::new(
            None,
            Some("add-or-update@example.com".to_string()),
            Some("Original".to_string()),
            None,
        ))
        .await
        .expect("Add should succeed");
        assert!(added.is_persisted());

        let mut changed = added.clone();
        changed.name = Some("Renamed".to_string());
        let updated = add_or_update_user(changed).await.expect("Update should succeed");

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.name.as_deref(), Some("Renamed"));
        assert!(updated.updated_at >= added.updated_at);
    }

    #[tokio::test]
    #[serial]
    async fn test_get_user_maps_not_found() {
        init_test_environment().await;

        let result = get_user(i64::MAX).await;
        match result {
            Err(CoordinationError::ResourceNotFound {
                resource_type,
                resource_id,
            }) => {
                assert_eq!(resource_type, "User");
                assert_eq!(resource_id, i64::MAX.to_string());
            }
            other => panic!("Expected ResourceNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_list_users_by_tenant() {
        init_test_environment().await;

        let tenant = "tenant-listing";
        for i in 0..2 {
            add_or_update_user(User::new(
                None,
                Some(format!("tenant-listing-{i}@example.com")),
                None,
                Some(tenant.to_string()),
            ))
            .await
            .expect("Add should succeed");
        }
        add_or_update_user(User::new(
            None,
            Some("other-tenant@example.com".to_string()),
            None,
            Some("tenant-other".to_string()),
        ))
        .await
        .expect("Add should succeed");

        let listed = list_users_by_tenant(tenant).await.expect("Listing should succeed");
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|u| u.tenant_id.as_deref() == Some(tenant)));
    }

    /// Deleting twice is not an error; the second delete is informational
    #[tokio::test]
    #[serial]
    async fn test_delete_is_idempotent() {
        init_test_environment().await;

        let user = add_or_update_user(User::new(
            None,
            Some("delete-me@example.com".to_string()),
            None,
            None,
        ))
        .await
        .expect("Add should succeed");

        let first = delete_user_account(user.id).await.expect("Delete should succeed");
        assert_eq!(first, DeleteOutcome::Deleted);

        let second = delete_user_account(user.id).await.expect("Delete should succeed");
        assert_eq!(second, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    #[serial]
    async fn test_get_user_by_external_id() {
        init_test_environment().await;

        add_or_update_user(User::new(
            Some("ext-lookup".to_string()),
            Some("ext-lookup@example.com".to_string()),
            None,
            None,
        ))
        .await
        .expect("Add should succeed");

        let found = get_user_by_external_id("ext-lookup")
            .await
            .expect("Lookup should succeed");
        assert!(found.is_some());

        let missing = get_user_by_external_id("no-such-subject")
            .await
            .expect("Lookup should succeed");
        assert!(missing.is_none());
    }
}

use crate::storage::GENERIC_DATA_STORE;
use crate::userdb::{
    errors::UserError,
    types::{DeleteOutcome, User},
};

use super::postgres::*;
use super::sqlite::*;

pub struct UserStore;

impl UserStore {
    /// Initialize the user database tables and indexes
    pub async fn init() -> Result<(), UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Get a user by id; absent rows are an error
    pub async fn get_user(id: i64) -> Result<User, UserError> {
        Self::find_user(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Find a user by id; absent rows are `None`
    pub async fn find_user(id: i64) -> Result<Option<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            find_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            find_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Find a user by email; absent rows are `None`
    pub async fn find_by_email(email: &str) -> Result<Option<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            find_by_email_sqlite(pool, email).await
        } else if let Some(pool) = store.as_postgres() {
            find_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Find a user by the identity provider's subject id; absent rows are `None`
    pub async fn find_by_external_user_id(external_user_id: &str) -> Result<Option<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            find_by_external_user_id_sqlite(pool, external_user_id).await
        } else if let Some(pool) = store.as_postgres() {
            find_by_external_user_id_postgres(pool, external_user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// List all users
    pub async fn get_all_users() -> Result<Vec<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// List users belonging to an identity-provider tenant
    pub async fn get_users_by_tenant(tenant_id: &str) -> Result<Vec<User>, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_users_by_tenant_sqlite(pool, tenant_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_users_by_tenant_postgres(pool, tenant_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Insert a new user and return the stored row with its assigned id
    ///
    /// Any incoming id is reset to the "not yet persisted" sentinel and both
    /// timestamps are stamped here; callers never control them. A
    /// unique-constraint violation on email surfaces as
    /// [`UserError::DuplicateEmail`].
    pub async fn add_user(user: User) -> Result<User, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            add_user_sqlite(pool, user).await
        } else if let Some(pool) = store.as_postgres() {
            add_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Persist an existing user, refreshing its `updated_at` stamp
    pub async fn update_user(user: User) -> Result<User, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            update_user_sqlite(pool, user).await
        } else if let Some(pool) = store.as_postgres() {
            update_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Delete a user by id; deleting an absent row is not an error
    pub async fn delete_user(id: i64) -> Result<DeleteOutcome, UserError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}

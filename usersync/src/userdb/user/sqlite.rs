use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::storage::DB_TABLE_USERS;
use crate::userdb::{
    errors::UserError,
    types::{DeleteOutcome, User},
};

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    // Create users table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_user_id TEXT,
            email TEXT,
            name TEXT,
            tenant_id TEXT,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    // Uniqueness only applies to rows that carry an email
    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_{0}_email ON {0}(email) WHERE email IS NOT NULL
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    // Secondary lookup indexes
    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{0}_external_user_id ON {0}(external_user_id)
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{0}_tenant_id ON {0}(tenant_id)
        "#,
        table_name
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn find_user_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {} WHERE id = ?
        "#,
        table_name
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn find_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {} WHERE email = ?
        "#,
        table_name
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn find_by_external_user_id_sqlite(
    pool: &Pool<Sqlite>,
    external_user_id: &str,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {} WHERE external_user_id = ?
        "#,
        table_name
    ))
    .bind(external_user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {} ORDER BY id
        "#,
        table_name
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_users_by_tenant_sqlite(
    pool: &Pool<Sqlite>,
    tenant_id: &str,
) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {} WHERE tenant_id = ? ORDER BY id
        "#,
        table_name
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn add_user_sqlite(pool: &Pool<Sqlite>, user: User) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    // The store owns id assignment and timestamps; whatever the caller sent
    // is discarded here.
    let now = Utc::now();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {} (external_user_id, email, name, tenant_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
        table_name
    ))
    .bind(&user.external_user_id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.tenant_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| translate_insert_error(e, user.email.as_deref()))
}

pub(super) async fn update_user_sqlite(pool: &Pool<Sqlite>, user: User) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {} SET
            external_user_id = ?,
            email = ?,
            name = ?,
            tenant_id = ?,
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
        table_name
    ))
    .bind(&user.external_user_id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.tenant_id)
    .bind(Utc::now())
    .bind(user.id)
    .fetch_optional(pool)
    .await
    .map_err(|e| translate_insert_error(e, user.email.as_deref()))?
    .ok_or(UserError::NotFound(user.id))
}

pub(super) async fn delete_user_sqlite(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<DeleteOutcome, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {} WHERE id = ?
        "#,
        table_name
    ))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    if result.rows_affected() == 0 {
        Ok(DeleteOutcome::NotFound)
    } else {
        Ok(DeleteOutcome::Deleted)
    }
}

// Translate unique-constraint violations into the domain-level duplicate
// signal; every other failure is an opaque storage error.
fn translate_insert_error(err: sqlx::Error, email: Option<&str>) -> UserError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            UserError::DuplicateEmail(email.unwrap_or_default().to_string())
        }
        _ => UserError::Storage(err.to_string()),
    }
}

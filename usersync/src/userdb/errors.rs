use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("User with id {0} not found")]
    NotFound(i64),

    /// Unique-constraint violation on the email column, translated at this
    /// boundary so the raw database error never leaks upward
    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

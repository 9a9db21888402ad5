//! Error types for the coordination layer

use thiserror::Error;

use crate::userdb::UserError;

/// Errors that can occur while coordinating user synchronization
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// The login candidate carried no usable email
    #[error("Email is required for login.")]
    EmailRequired,

    /// Another request created a user with the same email first
    #[error("A user with this email already exists. Please try again.")]
    EmailConflict,

    /// Resource not found with context
    #[error("Resource not found: {resource_type} {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    /// Unauthorized access error
    #[error("Unauthorized access")]
    Unauthorized,

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Error from the user store; Display passes the original message through
    /// so the endpoint layer can surface it verbatim
    #[error(transparent)]
    User(UserError),
}

impl CoordinationError {
    /// Log the error and return self
    ///
    /// Logs the error with appropriate context and returns self, allowing for
    /// method chaining and explicit logging when needed.
    pub fn log(self) -> Self {
        match &self {
            Self::EmailRequired => tracing::debug!("Login rejected: email is required"),
            Self::EmailConflict => tracing::warn!("Login lost a duplicate-email creation race"),
            Self::ResourceNotFound {
                resource_type,
                resource_id,
            } => tracing::error!("Resource not found: {} {}", resource_type, resource_id),
            Self::Unauthorized => tracing::error!("Unauthorized access"),
            Self::Database(msg) => tracing::error!("Database error: {}", msg),
            Self::User(err) => tracing::error!("User store error: {}", err),
        }
        self
    }

    /// Whether this is a validation-class error (bad input, not a failure)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmailRequired)
    }
}

// Custom From implementation that automatically logs errors
impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        let error = Self::User(err);
        tracing::error!("{}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<CoordinationError>();
    }

    #[test]
    fn test_error_display() {
        let err = CoordinationError::EmailRequired;
        assert_eq!(err.to_string(), "Email is required for login.");

        let err = CoordinationError::EmailConflict;
        assert_eq!(
            err.to_string(),
            "A user with this email already exists. Please try again."
        );

        let err = CoordinationError::ResourceNotFound {
            resource_type: "User".to_string(),
            resource_id: "123".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: User 123");

        let err = CoordinationError::Unauthorized;
        assert_eq!(err.to_string(), "Unauthorized access");

        let err = CoordinationError::Database("db error".to_string());
        assert_eq!(err.to_string(), "Database error: db error");
    }

    /// Wrapped store errors surface their original message unchanged
    #[test]
    fn test_from_user_error_is_transparent() {
        let user_err = UserError::Storage("connection reset".to_string());
        let err: CoordinationError = user_err.into();

        assert_eq!(err.to_string(), "Storage error: connection reset");
        match err {
            CoordinationError::User(UserError::Storage(msg)) => {
                assert_eq!(msg, "connection reset");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_is_validation() {
        assert!(CoordinationError::EmailRequired.is_validation());
        assert!(!CoordinationError::EmailConflict.is_validation());
        assert!(!CoordinationError::Database("x".to_string()).is_validation());
    }

    #[test]
    fn test_error_log_returns_self() {
        let err = CoordinationError::EmailConflict.log();
        assert!(matches!(err, CoordinationError::EmailConflict));
    }
}

use thiserror::Error;

/// Classified, user-facing request failures
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("Invalid request. Please check your input and try again.")]
    BadRequest,

    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("The requested resource was not found.")]
    NotFound,

    #[error("There was a conflict with your request. Please refresh and try again.")]
    Conflict,

    #[error("Too many requests. Please wait a moment and try again.")]
    RateLimited,

    #[error("Server error. Please try again later.")]
    Server(u16),

    #[error("Network connection problem. Please check your internet connection.")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The server answered with a standard envelope carrying errors
    #[error("{}", errors.first().map(String::as_str).unwrap_or("An unexpected error occurred"))]
    Api {
        status: u16,
        errors: Vec<String>,
        exception_details: Option<String>,
    },
}

impl ClientError {
    /// Classify an HTTP status code into a user-facing error
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            429 => Self::RateLimited,
            s if s >= 500 => Self::Server(s),
            s => Self::Network(format!("Unexpected HTTP status {s}")),
        }
    }

    /// Whether a retry might help (server errors and transport failures)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Network(_))
    }
}

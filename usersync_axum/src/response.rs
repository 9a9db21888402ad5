use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Uniform response envelope returned by every endpoint
///
/// Clients treat an empty `errors` list as the sole success predicate; the
/// `status` field mirrors the HTTP status code and is informative only.
/// `exception_details` is populated solely for unexpected failures.
///
/// An envelope is built exactly once from the computed outcome; status is
/// never reassigned after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub status: u16,
    pub errors: Vec<String>,
    pub exception_details: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Success envelope wrapping a payload
    pub fn ok(result: T) -> Self {
        Self {
            result: Some(result),
            status: StatusCode::OK.as_u16(),
            errors: Vec::new(),
            exception_details: None,
        }
    }

    /// Failure envelope with a single user-facing error
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            result: None,
            status: status.as_u16(),
            errors: vec![message.into()],
            exception_details: None,
        }
    }

    /// Failure envelope carrying diagnostic details for operator visibility
    pub fn failure(
        status: StatusCode,
        errors: Vec<String>,
        exception_details: Option<String>,
    ) -> Self {
        Self {
            result: None,
            status: status.as_u16(),
            errors,
            exception_details,
        }
    }

    /// The success predicate clients rely on
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

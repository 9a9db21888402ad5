use http::StatusCode;
use usersync::CoordinationError;

use crate::response::ApiResponse;

/// Map a coordination error to the status class its envelope carries
///
/// Validation errors are bad requests, the duplicate-email race is a
/// conflict, and anything unexpected is an internal error. A non-empty error
/// list never maps to a success status.
pub(crate) fn status_for(err: &CoordinationError) -> StatusCode {
    match err {
        CoordinationError::EmailRequired => StatusCode::BAD_REQUEST,
        CoordinationError::EmailConflict => StatusCode::CONFLICT,
        CoordinationError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
        CoordinationError::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the failure envelope for a coordination error
///
/// The error's message becomes the sole error entry; diagnostic details are
/// attached only for unexpected (infrastructure) failures.
pub(crate) fn envelope_for<T>(err: CoordinationError) -> ApiResponse<T> {
    let status = status_for(&err);
    let exception_details = if status == StatusCode::INTERNAL_SERVER_ERROR {
        Some(format!("{err:?}"))
    } else {
        None
    };
    ApiResponse::failure(status, vec![err.to_string()], exception_details)
}

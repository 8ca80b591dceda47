//! Mapping of service errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use todo_core::{ErrorKind, ServiceError};

/// Error returned by every handler. Renders as a plain-text body.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(ServiceError::client_input(message))
    }

    pub fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.0.kind() {
            ErrorKind::ClientInput => tracing::warn!(error = %self.0, "rejected request"),
            ErrorKind::Infrastructure => tracing::error!(error = %self.0, "request failed"),
        }
        (status, self.0.message().to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};

use crate::ChatError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub error: anyhow::Error,
    identity_status: StatusCode,
}

impl AppError {
    /// Status used when the caller's identity does not resolve. Endpoints
    /// disagree on this one (404 vs 422), so each handler picks.
    pub fn identity_status(mut self, status: StatusCode) -> Self {
        self.identity_status = status;
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.error.downcast_ref::<ChatError>() {
            Some(ChatError::Validation(details)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(details.clone())).into_response()
            }
            Some(ChatError::Conflict(_)) => StatusCode::CONFLICT.into_response(),
            Some(err) if err.is_unresolved_identity() => self.identity_status.into_response(),
            _ => {
                tracing::error!(error = %self.error, backtrace = %self.error.backtrace(), "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.error.to_string()).into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            error: err.into(),
            identity_status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

//! List query errors
//!
//! Only the search term can fail a list request; every other parameter falls
//! back to its default.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListQueryError {
    #[error("Search term must be at most {max} characters (got {actual})")]
    SearchTooLong { max: usize, actual: usize },

    #[error("Search term contains a forbidden operator: {0}")]
    ForbiddenSearchPattern(String),
}

impl ListQueryError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::BadRequest
    }

    pub fn to_app_error(&self) -> AppError {
        let action = match self {
            ListQueryError::SearchTooLong { .. } => "Shorten the search term",
            ListQueryError::ForbiddenSearchPattern(_) => "Search for plain text only",
        };
        AppError::new(self.kind(), self.to_string())
            .with_param("search")
            .with_action(action)
    }

    fn log(&self) {
        match self {
            ListQueryError::ForbiddenSearchPattern(operator) => {
                tracing::warn!(operator = %operator, "Operator injection attempt in search term");
            }
            ListQueryError::SearchTooLong { actual, .. } => {
                tracing::debug!(length = actual, "Search term rejected as too long");
            }
        }
    }
}

impl From<ListQueryError> for AppError {
    fn from(err: ListQueryError) -> Self {
        err.log();
        err.to_app_error()
    }
}

impl IntoResponse for ListQueryError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

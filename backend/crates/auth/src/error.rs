//! Failures of sign-up, sign-in, token rotation and role checks
//!
//! Rendered through `AppError`, so every auth failure shares the
//! problem-details body of the rest of the API.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::entity::auth::Auth;
use crate::domain::value_object::user_name::UserNameError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("User name already exists")]
    UserNameTaken,

    #[error("Email already registered")]
    EmailTaken,

    /// Unknown user or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Authentication required")]
    MissingToken,

    /// Bad signature, expired, wrong issuer or wrong token type
    #[error("Invalid or expired token")]
    InvalidToken,

    /// A revoked refresh token was presented again
    #[error("Refresh token has already been used")]
    RefreshTokenReused,

    #[error("Insufficient role for this operation")]
    InsufficientRole,

    /// Field-level validation failure (user name, email, password)
    #[error("{0}")]
    Validation(AppError),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        use AuthError::*;
        match self {
            UserNotFound => ErrorKind::NotFound,
            UserNameTaken | EmailTaken => ErrorKind::Conflict,
            InvalidCredentials | MissingToken | InvalidToken | RefreshTokenReused => {
                ErrorKind::Unauthorized
            }
            AccountLocked => ErrorKind::Locked,
            AccountDisabled | InsufficientRole => ErrorKind::Forbidden,
            Validation(inner) => inner.kind(),
            Configuration(_) | Database(_) | Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Validation(inner) => inner,
            AuthError::Database(e) => AppError::from(e),
            AuthError::UserNameTaken => AppError::conflict(self.to_string()).with_param("userName"),
            AuthError::EmailTaken => AppError::conflict(self.to_string()).with_param("email"),
            AuthError::AccountLocked => AppError::locked(self.to_string())
                .with_action(format!("Try again in {} minutes", Auth::LOCKOUT_MINUTES)),
            AuthError::MissingToken => AppError::new(ErrorKind::Unauthorized, self.to_string())
                .with_action("Send `Authorization: Bearer <accessToken>`"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Security-relevant rejections at `warn`, server faults at `error`
    fn log(&self) {
        match self {
            AuthError::Database(e) => tracing::error!(error = %e, "Auth database error"),
            AuthError::Internal(msg) | AuthError::Configuration(msg) => {
                tracing::error!(message = %msg, "Auth internal error")
            }
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::RefreshTokenReused
            | AuthError::InvalidToken
            | AuthError::InsufficientRole => tracing::warn!(error = %self, "Auth rejected"),
            _ => tracing::debug!(error = %self, "Auth error"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err)
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<UserNameError> for AuthError {
    fn from(err: UserNameError) -> Self {
        AuthError::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::MissingToken.status_code(), 401);
        assert_eq!(AuthError::RefreshTokenReused.status_code(), 401);
        assert_eq!(AuthError::InsufficientRole.status_code(), 403);
        assert_eq!(AuthError::AccountDisabled.status_code(), 403);
        assert_eq!(AuthError::AccountLocked.status_code(), 423);
        assert_eq!(AuthError::UserNameTaken.status_code(), 409);
        assert_eq!(AuthError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_validation_keeps_param() {
        let err = AuthError::from(AppError::bad_request("Invalid email format").with_param("email"));
        assert_eq!(err.status_code(), 400);
        let app = err.into_app_error();
        assert_eq!(app.param(), Some("email"));
    }

    #[test]
    fn test_lockout_tells_when_to_retry() {
        let app = AuthError::AccountLocked.into_app_error();
        assert_eq!(app.status_code(), 423);
        assert_eq!(app.action(), Some("Try again in 15 minutes"));
    }

    #[test]
    fn test_server_app_error_becomes_internal() {
        let err = AuthError::from(AppError::internal("hash failed"));
        assert!(matches!(err, AuthError::Internal(_)));
    }
}

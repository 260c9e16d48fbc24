//! `sqlx::Error` → [`AppError`]
//!
//! Constraint violations become client errors; anything that means "the
//! database is busy or gone" becomes 503 so the caller may retry.

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let (kind, message) = classify(&err);
        AppError::new(kind, message).with_source(err)
    }
}

fn classify(err: &sqlx::Error) -> (ErrorKind, &'static str) {
    match err {
        sqlx::Error::RowNotFound => (ErrorKind::NotFound, "Record not found"),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            (ErrorKind::ServiceUnavailable, "Database unavailable")
        }
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| sqlstate(&code))
            .unwrap_or((ErrorKind::InternalServerError, "Database error")),
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

/// https://www.postgresql.org/docs/current/errcodes-appendix.html
fn sqlstate(code: &str) -> (ErrorKind, &'static str) {
    match code {
        "23505" => (ErrorKind::Conflict, "Duplicate value"),
        "23503" => (ErrorKind::Conflict, "Record is still referenced"),
        "23502" | "23514" => (ErrorKind::BadRequest, "Value violates a constraint"),
        // serialization failure, deadlock
        "40001" | "40P01" => (ErrorKind::ServiceUnavailable, "Concurrent update, please retry"),
        c if c.starts_with("53") || c.starts_with("57") => {
            (ErrorKind::ServiceUnavailable, "Database unavailable")
        }
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

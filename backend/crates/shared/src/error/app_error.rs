//! The error every storefront layer eventually becomes
//!
//! Feature crates keep their own `thiserror` enums and convert into
//! [`AppError`] at the HTTP edge, where it is rendered as problem details.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

type Text = Cow<'static, str>;
type Source = Box<dyn Error + Send + Sync + 'static>;

/// A client-facing failure: status class, message and optional hints
///
/// `param` names the offending request field (`search`, `items`,
/// `shippingAddress`); `action` tells the caller what to do next. The
/// `source` chain is for logs only.
///
/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::bad_request("Search term is too long")
///     .with_param("search")
///     .with_action("Use at most 100 characters");
/// assert_eq!(err.status_code(), 400);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Text,
    param: Option<Text>,
    action: Option<Text>,
    source: Option<Source>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Text>) -> Self {
        Self {
            kind,
            message: message.into(),
            param: None,
            action: None,
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Sign-in refused while the lockout window is open
    pub fn locked(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::Locked, message)
    }

    pub fn too_many_requests(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    pub fn internal(message: impl Into<Text>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn with_param(mut self, param: impl Into<Text>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<Text>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }

    /// Text safe to put in a response: server errors collapse to the title
    pub fn public_detail(&self) -> &str {
        if self.is_server_error() {
            self.kind.title()
        } else {
            &self.message
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("param", &self.param)
            .field("action", &self.action)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.status_code(), self.message)?;
        match &self.param {
            Some(param) => write!(f, " [{param}]"),
            None => Ok(()),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_are_optional() {
        let err = AppError::new(ErrorKind::NotFound, "Order not found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Order not found");
        assert!(err.param().is_none());
        assert!(err.action().is_none());
    }

    #[test]
    fn test_hints_show_in_display() {
        let err = AppError::bad_request("Search term is too long")
            .with_param("search")
            .with_action("Shorten the search term");
        assert_eq!(err.action(), Some("Shorten the search term"));
        assert_eq!(err.to_string(), "400: Search term is too long [search]");
    }

    #[test]
    fn test_source_is_kept_for_logging() {
        let io = std::io::Error::other("disk full");
        let err = AppError::internal("Could not store image").with_source(io);
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_public_detail_hides_server_messages() {
        let err = AppError::internal("connection refused on 10.0.0.4");
        assert_eq!(err.public_detail(), "Internal Server Error");

        let err = AppError::conflict("Insufficient stock");
        assert_eq!(err.public_detail(), "Insufficient stock");
    }

    #[test]
    fn test_shorthand_constructors() {
        assert_eq!(AppError::forbidden("x").kind(), ErrorKind::Forbidden);
        assert_eq!(AppError::locked("x").status_code(), 423);
        assert_eq!(AppError::too_many_requests("x").status_code(), 429);
    }
}

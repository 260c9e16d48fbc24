//! axum glue: extractor rejections in, RFC 7807 problem details out

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::app_error::AppError;
use super::kind::ErrorKind;

/// Wire shape of every error body
#[derive(Debug, Serialize)]
pub struct ProblemDetails<'a> {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: &'static str,
    pub status: u16,
    pub detail: &'a str,
    pub param: Option<&'a str>,
    pub action: Option<&'a str>,
}

impl<'a> From<&'a AppError> for ProblemDetails<'a> {
    fn from(err: &'a AppError) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", err.status_code()),
            title: err.kind().title(),
            status: err.status_code(),
            detail: err.public_detail(),
            param: err.param(),
            action: err.action(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ProblemDetails::from(&self))).into_response()
    }
}

/// Keep 413 and 415 from the rejection, everything else is a bad request
fn rejection_kind(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::PayloadTooLarge,
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ErrorKind::UnsupportedMediaType,
        _ => ErrorKind::BadRequest,
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::new(rejection_kind(rejection.status()), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(rejection_kind(err.status()), err.body_text())
    }
}

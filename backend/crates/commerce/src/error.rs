//! Commerce Error Types
//!
//! Catalog, customer and order failures, mapped onto the unified
//! `kernel::error::AppError` response.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::ProductId;
use listing::ListQueryError;
use platform::upload::UploadError;
use thiserror::Error;

use crate::domain::value_object::order_status::OrderStatus;

pub type CommerceResult<T> = Result<T, CommerceError>;

#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    /// Placing an order needs a saved profile
    #[error("Customer profile required")]
    ProfileRequired,

    #[error("Customer account is blocked")]
    CustomerBlocked,

    #[error("Product {0} is not available for sale")]
    ProductUnavailable(ProductId),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i32,
    },

    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Customer has open orders")]
    CustomerHasOpenOrders,

    /// Rejected list parameters (search term)
    #[error(transparent)]
    ListQuery(#[from] ListQueryError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Field-level validation failure
    #[error("{0}")]
    Validation(AppError),

    #[error("Image storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommerceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::ProductNotFound
            | CommerceError::OrderNotFound
            | CommerceError::CustomerNotFound => ErrorKind::NotFound,
            CommerceError::ProfileRequired
            | CommerceError::ProductUnavailable(_)
            | CommerceError::InsufficientStock { .. }
            | CommerceError::InvalidStatusTransition { .. }
            | CommerceError::CustomerHasOpenOrders => ErrorKind::Conflict,
            CommerceError::CustomerBlocked => ErrorKind::Forbidden,
            CommerceError::ListQuery(e) => e.kind(),
            CommerceError::Upload(e) => e.kind(),
            CommerceError::Validation(inner) => inner.kind(),
            CommerceError::Storage(_) | CommerceError::Database(_) | CommerceError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            CommerceError::Validation(inner) => inner,
            CommerceError::ListQuery(e) => e.into(),
            CommerceError::Upload(e) => e.into(),
            CommerceError::Database(e) => AppError::from(e),
            CommerceError::ProfileRequired => AppError::conflict(self.to_string())
                .with_action("Save your profile with PUT /api/customers/me first"),
            CommerceError::InsufficientStock { .. } | CommerceError::ProductUnavailable(_) => {
                AppError::conflict(self.to_string()).with_param("items")
            }
            CommerceError::CustomerHasOpenOrders => AppError::conflict(self.to_string())
                .with_action("Cancel or complete the customer's orders first"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            CommerceError::Database(e) => {
                tracing::error!(error = %e, "Commerce database error");
            }
            CommerceError::Storage(e) => {
                tracing::error!(error = %e, "Image storage error");
            }
            CommerceError::Internal(msg) => {
                tracing::error!(message = %msg, "Commerce internal error");
            }
            CommerceError::CustomerBlocked => {
                tracing::warn!("Blocked customer attempted a write");
            }
            // logged by their own conversions
            CommerceError::ListQuery(_) | CommerceError::Upload(_) => {}
            _ => {
                tracing::debug!(error = %self, "Commerce error");
            }
        }
    }
}

impl IntoResponse for CommerceError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for CommerceError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            CommerceError::Validation(err)
        } else {
            CommerceError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CommerceError::ProductNotFound.status_code(), 404);
        assert_eq!(CommerceError::OrderNotFound.status_code(), 404);
        assert_eq!(CommerceError::CustomerBlocked.status_code(), 403);
        assert_eq!(
            CommerceError::InvalidStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            }
            .status_code(),
            409
        );
        assert_eq!(CommerceError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_list_query_error_is_bad_request_on_search() {
        let err = CommerceError::from(ListQueryError::ForbiddenSearchPattern("$where".into()));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.into_app_error().param(), Some("search"));
    }

    #[test]
    fn test_upload_error_keeps_kind() {
        let err = CommerceError::from(UploadError::TooLarge { max: 10, actual: 20 });
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn test_transition_message_names_statuses() {
        let err = CommerceError::InvalidStatusTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Cannot change order status from shipped to cancelled"
        );
    }
}

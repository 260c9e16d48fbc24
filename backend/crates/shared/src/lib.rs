//! Storefront kernel
//!
//! The vocabulary every other crate agrees on: the [`error::app_error::AppError`]
//! response error and typed entity identifiers in [`id`]. Nothing here knows
//! about products, orders or users beyond their names.

pub mod error {
    pub mod app_error;
    #[cfg(feature = "sqlx")]
    pub mod database;
    #[cfg(feature = "axum")]
    pub mod http;
    pub mod kind;
}
pub mod id;

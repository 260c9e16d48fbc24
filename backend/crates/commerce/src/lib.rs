//! Commerce Backend Module
//!
//! Products, customers and orders, layered like `auth`:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Per-aggregate services and list definitions
//! - `infra/` - PostgreSQL repository, on-disk image store
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Public catalog reads; staff and admins manage products and images
//! - Customer profiles keyed by the auth user id
//! - Orders that decrement stock atomically and return it on cancel
//! - Every list endpoint runs through `listing`, so filters, sort keys and
//!   search columns come from fixed allow-lists

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CommerceConfig;
pub use error::{CommerceError, CommerceResult};
pub use infra::{DiskImageStore, PgCommerceRepository};
pub use presentation::router::{commerce_router, commerce_router_generic};

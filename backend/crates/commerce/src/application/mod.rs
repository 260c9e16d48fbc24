//! Application Layer
//!
//! Use cases per aggregate and the list definitions they run.

pub mod catalog;
pub mod config;
pub mod customers;
pub mod lists;
pub mod orders;

// Re-exports
pub use catalog::{CatalogService, CatalogView, ProductInput};
pub use config::CommerceConfig;
pub use customers::{CustomerService, ProfileInput};
pub use orders::{OrderService, PlaceOrderInput};

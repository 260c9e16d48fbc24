//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    customer::{Customer, CustomerProfile},
    order::{NewOrder, Order, OrderItem, OrderLines},
    product::{Product, ProductDraft},
};
pub use repository::{CustomerRepository, ImageStore, OrderRepository, ProductRepository};

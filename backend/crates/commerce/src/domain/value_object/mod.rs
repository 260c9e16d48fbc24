//! Value Object Module

pub mod customer_status;
pub mod money;
pub mod order_status;
pub mod product_status;

pub use kernel::id::{CustomerId, OrderId, ProductId};

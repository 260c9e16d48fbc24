//! Repository Traits
//!
//! `list` methods take an already validated [`ListQuery`]; implementations
//! only render it.

use listing::{ListQuery, PageResult};

use crate::domain::entity::{
    customer::Customer,
    order::{NewOrder, Order},
    product::Product,
};
use crate::domain::value_object::{
    CustomerId, OrderId, ProductId, order_status::OrderStatus,
};
use crate::error::CommerceResult;

#[trait_variant::make(ProductRepository: Send)]
pub trait LocalProductRepository {
    async fn create(&self, product: &Product) -> CommerceResult<()>;

    async fn find_by_id(&self, product_id: &ProductId) -> CommerceResult<Option<Product>>;

    async fn update(&self, product: &Product) -> CommerceResult<()>;

    /// `false` when nothing was deleted
    async fn delete(&self, product_id: &ProductId) -> CommerceResult<bool>;

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Product>>;
}

#[trait_variant::make(CustomerRepository: Send)]
pub trait LocalCustomerRepository {
    async fn find_by_id(&self, customer_id: &CustomerId) -> CommerceResult<Option<Customer>>;

    /// Insert or replace the profile
    async fn upsert(&self, customer: &Customer) -> CommerceResult<()>;

    async fn delete(&self, customer_id: &CustomerId) -> CommerceResult<bool>;

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Customer>>;
}

#[trait_variant::make(OrderRepository: Send)]
pub trait LocalOrderRepository {
    /// Decrement stock for every line and insert the order, atomically
    ///
    /// Fails with `InsufficientStock`, `ProductUnavailable` or
    /// `ProductNotFound` when a line can no longer be served; nothing is
    /// written in that case.
    async fn place(&self, order: &NewOrder) -> CommerceResult<Order>;

    async fn find_by_id(&self, order_id: &OrderId) -> CommerceResult<Option<Order>>;

    /// Persist `order.status` if the stored status is still `from`
    ///
    /// Returns `false` when another writer changed the status first.
    async fn update_status(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool>;

    /// [`update_status`](LocalOrderRepository::update_status) to cancelled,
    /// returning the items to stock in the same transaction
    async fn cancel(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool>;

    /// Delete the order; an open order's items go back to stock
    async fn delete(&self, order: &Order) -> CommerceResult<bool>;

    async fn has_open_orders(&self, customer_id: &CustomerId) -> CommerceResult<bool>;

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Order>>;
}

/// Storage for uploaded product images
#[trait_variant::make(ImageStore: Send)]
pub trait LocalImageStore {
    /// Store `bytes` under `file_name`, returning the public path
    ///
    /// File names are content-addressed, so storing an existing name is a
    /// no-op.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> CommerceResult<String>;
}

//! In-memory repository
//!
//! Backs service and router tests without a database. Lists run through
//! `listing::memory`, which mirrors the SQL filter, search and sort rules.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use chrono::Utc;
use listing::memory::{Document, MemoryCollection};
use listing::{FilterValue, ListQuery, PageResult, execute_list};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::{
    customer::Customer,
    order::{NewOrder, Order},
    product::Product,
};
use crate::domain::repository::{CustomerRepository, OrderRepository, ProductRepository};
use crate::domain::value_object::{
    CustomerId, OrderId, ProductId, order_status::OrderStatus,
};
use crate::error::{CommerceError, CommerceResult};

impl Document for Product {
    fn id(&self) -> Uuid {
        self.product_id.into_uuid()
    }

    fn field(&self, column: &str) -> Option<FilterValue> {
        match column {
            "product_id" => Some(FilterValue::Uuid(self.product_id.into_uuid())),
            "name" => Some(FilterValue::Text(self.name.clone())),
            "description" => self.description.clone().map(FilterValue::Text),
            "category" => Some(FilterValue::Text(self.category.clone())),
            "price_cents" => Some(FilterValue::Integer(self.price.cents())),
            "stock" => Some(FilterValue::Integer(i64::from(self.stock))),
            "status" => Some(FilterValue::Text(self.status.code().to_string())),
            "created_at" => Some(FilterValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl Document for Customer {
    fn id(&self) -> Uuid {
        self.customer_id.into_uuid()
    }

    fn field(&self, column: &str) -> Option<FilterValue> {
        match column {
            "customer_id" => Some(FilterValue::Uuid(self.customer_id.into_uuid())),
            "full_name" => Some(FilterValue::Text(self.full_name.clone())),
            "email" => Some(FilterValue::Text(self.email.clone())),
            "phone" => self.phone.clone().map(FilterValue::Text),
            "status" => Some(FilterValue::Text(self.status.code().to_string())),
            "created_at" => Some(FilterValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

impl Document for Order {
    fn id(&self) -> Uuid {
        self.order_id.into_uuid()
    }

    fn field(&self, column: &str) -> Option<FilterValue> {
        match column {
            "order_id" => Some(FilterValue::Uuid(self.order_id.into_uuid())),
            "order_number" => Some(FilterValue::Integer(self.order_number)),
            "customer_id" => Some(FilterValue::Uuid(self.customer_id.into_uuid())),
            "customer_name" => Some(FilterValue::Text(self.customer_name.clone())),
            "customer_email" => Some(FilterValue::Text(self.customer_email.clone())),
            "total_amount_cents" => Some(FilterValue::Integer(self.total_amount.cents())),
            "status" => Some(FilterValue::Text(self.status.code().to_string())),
            "created_at" => Some(FilterValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryCommerceRepository {
    products: Arc<MemoryCollection<Product>>,
    customers: Arc<MemoryCollection<Customer>>,
    orders: Arc<MemoryCollection<Order>>,
    order_numbers: Arc<AtomicI64>,
    /// Serializes stock-moving writes
    stock_lock: Arc<Mutex<()>>,
    /// List queries run against any collection
    list_calls: Arc<AtomicUsize>,
}

impl MemoryCommerceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stock_of(&self, product_id: &ProductId) -> Option<i32> {
        self.products.get(product_id.into_uuid()).await.map(|p| p.stock)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn restock(&self, order: &Order) {
        for item in &order.items {
            if let Some(mut product) = self.products.get(item.product_id.into_uuid()).await {
                product.stock = product
                    .stock
                    .saturating_add(i32::try_from(item.quantity).unwrap_or(i32::MAX));
                product.updated_at = Utc::now();
                self.products.upsert(product).await;
            }
        }
    }

    /// Store `order` if the stored copy still has status `from`
    async fn swap_status(&self, order: &Order, from: OrderStatus) -> bool {
        match self.orders.get(order.order_id.into_uuid()).await {
            Some(stored) if stored.status == from => {
                self.orders.upsert(order.clone()).await;
                true
            }
            _ => false,
        }
    }
}

impl ProductRepository for MemoryCommerceRepository {
    async fn create(&self, product: &Product) -> CommerceResult<()> {
        self.products.upsert(product.clone()).await;
        Ok(())
    }

    async fn find_by_id(&self, product_id: &ProductId) -> CommerceResult<Option<Product>> {
        Ok(self.products.get(product_id.into_uuid()).await)
    }

    async fn update(&self, product: &Product) -> CommerceResult<()> {
        if self.products.get(product.product_id.into_uuid()).await.is_none() {
            return Err(CommerceError::ProductNotFound);
        }
        self.products.upsert(product.clone()).await;
        Ok(())
    }

    async fn delete(&self, product_id: &ProductId) -> CommerceResult<bool> {
        Ok(self.products.remove(product_id.into_uuid()).await)
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Product>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(execute_list(&*self.products, query).await?)
    }
}

impl CustomerRepository for MemoryCommerceRepository {
    async fn find_by_id(&self, customer_id: &CustomerId) -> CommerceResult<Option<Customer>> {
        Ok(self.customers.get(customer_id.into_uuid()).await)
    }

    async fn upsert(&self, customer: &Customer) -> CommerceResult<()> {
        self.customers.upsert(customer.clone()).await;
        Ok(())
    }

    async fn delete(&self, customer_id: &CustomerId) -> CommerceResult<bool> {
        Ok(self.customers.remove(customer_id.into_uuid()).await)
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Customer>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(execute_list(&*self.customers, query).await?)
    }
}

impl OrderRepository for MemoryCommerceRepository {
    async fn place(&self, order: &NewOrder) -> CommerceResult<Order> {
        let _guard = self.stock_lock.lock().await;

        // Check every line before touching any stock
        let mut products = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product = self
                .products
                .get(item.product_id.into_uuid())
                .await
                .ok_or(CommerceError::ProductNotFound)?;
            if !product.status.is_purchasable() {
                return Err(CommerceError::ProductUnavailable(item.product_id));
            }
            if i64::from(product.stock) < i64::from(item.quantity) {
                return Err(CommerceError::InsufficientStock {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available: product.stock,
                });
            }
            products.push(product);
        }

        let now = Utc::now();
        for (mut product, item) in products.into_iter().zip(&order.items) {
            product.stock -= i32::try_from(item.quantity).unwrap_or(i32::MAX);
            product.updated_at = now;
            self.products.upsert(product).await;
        }

        let order_number = self.order_numbers.fetch_add(1, Ordering::SeqCst) + 1;
        let placed = order.clone().into_order(order_number);
        self.orders.upsert(placed.clone()).await;
        Ok(placed)
    }

    async fn find_by_id(&self, order_id: &OrderId) -> CommerceResult<Option<Order>> {
        Ok(self.orders.get(order_id.into_uuid()).await)
    }

    async fn update_status(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool> {
        let _guard = self.stock_lock.lock().await;
        Ok(self.swap_status(order, from).await)
    }

    async fn cancel(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool> {
        let _guard = self.stock_lock.lock().await;
        if !self.swap_status(order, from).await {
            return Ok(false);
        }
        self.restock(order).await;
        Ok(true)
    }

    async fn delete(&self, order: &Order) -> CommerceResult<bool> {
        let _guard = self.stock_lock.lock().await;
        let Some(stored) = self.orders.get(order.order_id.into_uuid()).await else {
            return Ok(false);
        };
        self.orders.remove(stored.order_id.into_uuid()).await;
        if stored.status.is_open() {
            self.restock(&stored).await;
        }
        Ok(true)
    }

    async fn has_open_orders(&self, customer_id: &CustomerId) -> CommerceResult<bool> {
        Ok(self
            .orders
            .all()
            .await
            .iter()
            .any(|o| &o.customer_id == customer_id && o.status.is_open()))
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Order>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(execute_list(&*self.orders, query).await?)
    }
}

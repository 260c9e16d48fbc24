//! Order Use Cases
//!
//! Non-admin callers asking for someone else's order get 404, so order ids
//! cannot be probed.

use std::sync::Arc;

use auth::Principal;
use kernel::error::app_error::AppError;
use listing::{ListParams, OwnerScope, PageResult};
use platform::sanitize::clean_required;

use crate::application::lists::{MY_ORDERS, ORDERS};
use crate::domain::entity::customer::ADDRESS_MAX_CHARS;
use crate::domain::entity::order::{NewOrder, Order, OrderLines};
use crate::domain::entity::product::Product;
use crate::domain::repository::{CustomerRepository, OrderRepository, ProductRepository};
use crate::domain::value_object::{
    CustomerId, OrderId, ProductId, order_status::OrderStatus,
};
use crate::error::{CommerceError, CommerceResult};

#[derive(Debug, Clone)]
pub struct PlaceOrderInput {
    pub lines: Vec<(ProductId, u32)>,
    /// Falls back to the profile address
    pub shipping_address: Option<String>,
}

pub struct OrderService<R>
where
    R: OrderRepository + ProductRepository + CustomerRepository,
{
    repo: Arc<R>,
}

impl<R> OrderService<R>
where
    R: OrderRepository + ProductRepository + CustomerRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Every order, full filter and search surface
    pub async fn list_all(&self, params: &ListParams) -> CommerceResult<PageResult<Order>> {
        let query = ORDERS.build(params)?;
        OrderRepository::list(&*self.repo, &query).await
    }

    /// The caller's own orders
    pub async fn list_mine(
        &self,
        caller: &Principal,
        params: &ListParams,
    ) -> CommerceResult<PageResult<Order>> {
        let query = MY_ORDERS.build_scoped(
            params,
            OwnerScope {
                column: "customer_id",
                owner: caller.user_id.into_uuid(),
            },
        )?;
        OrderRepository::list(&*self.repo, &query).await
    }

    pub async fn get(&self, caller: &Principal, order_id: &OrderId) -> CommerceResult<Order> {
        let order = OrderRepository::find_by_id(&*self.repo, order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;

        if !caller.is_admin() && !order.is_owned_by(&caller.user_id.cast()) {
            return Err(CommerceError::OrderNotFound);
        }
        Ok(order)
    }

    pub async fn place(&self, caller: &Principal, input: PlaceOrderInput) -> CommerceResult<Order> {
        let customer_id: CustomerId = caller.user_id.cast();
        let customer = CustomerRepository::find_by_id(&*self.repo, &customer_id)
            .await?
            .ok_or(CommerceError::ProfileRequired)?;
        if customer.is_blocked() {
            return Err(CommerceError::CustomerBlocked);
        }

        let lines = OrderLines::new(input.lines)?;

        let mut products: Vec<Product> = Vec::with_capacity(lines.len());
        for (product_id, _) in lines.iter() {
            let product = ProductRepository::find_by_id(&*self.repo, &product_id)
                .await?
                .ok_or(CommerceError::ProductNotFound)?;
            products.push(product);
        }

        let address = input
            .shipping_address
            .or_else(|| customer.address.clone())
            .ok_or_else(|| {
                AppError::bad_request("Shipping address is required")
                    .with_param("shippingAddress")
                    .with_action("Send shippingAddress or add an address to your profile")
            })?;
        let address = clean_required(&address, ADDRESS_MAX_CHARS)
            .map_err(|e| e.for_field("shippingAddress"))?;

        let new_order = NewOrder::price(&customer, &lines, &products, address)?;
        let order = self.repo.place(&new_order).await?;

        tracing::info!(
            order_id = %order.order_id,
            order_number = order.order_number,
            customer_id = %order.customer_id,
            total_cents = order.total_amount.cents(),
            lines = order.items.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Admin status change; cancelling returns stock
    pub async fn change_status(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
    ) -> CommerceResult<Order> {
        let mut order = OrderRepository::find_by_id(&*self.repo, order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        let from = order.transition(next)?;

        let applied = if next == OrderStatus::Cancelled {
            self.repo.cancel(&order, from).await?
        } else {
            self.repo.update_status(&order, from).await?
        };
        if !applied {
            return Err(self.lost_race(order_id, next).await);
        }

        tracing::info!(order_id = %order_id, from = %from, to = %next, "Order status changed");

        Ok(order)
    }

    /// Owner or admin; only pending and processing orders
    pub async fn cancel(&self, caller: &Principal, order_id: &OrderId) -> CommerceResult<Order> {
        let mut order = self.get(caller, order_id).await?;

        if !caller.is_admin() {
            let customer = CustomerRepository::find_by_id(&*self.repo, &order.customer_id).await?;
            if customer.is_some_and(|c| c.is_blocked()) {
                return Err(CommerceError::CustomerBlocked);
            }
        }

        let from = order.transition(OrderStatus::Cancelled)?;
        if !self.repo.cancel(&order, from).await? {
            return Err(self.lost_race(order_id, OrderStatus::Cancelled).await);
        }

        tracing::info!(
            order_id = %order_id,
            by_admin = caller.is_admin(),
            "Order cancelled"
        );

        Ok(order)
    }

    pub async fn delete(&self, order_id: &OrderId) -> CommerceResult<()> {
        let order = OrderRepository::find_by_id(&*self.repo, order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound)?;
        if !OrderRepository::delete(&*self.repo, &order).await? {
            return Err(CommerceError::OrderNotFound);
        }

        tracing::info!(order_id = %order_id, status = %order.status, "Order deleted");

        Ok(())
    }

    /// Conflict describing the status some other writer left behind
    async fn lost_race(&self, order_id: &OrderId, next: OrderStatus) -> CommerceError {
        match OrderRepository::find_by_id(&*self.repo, order_id).await {
            Ok(Some(current)) => CommerceError::InvalidStatusTransition {
                from: current.status,
                to: next,
            },
            Ok(None) => CommerceError::OrderNotFound,
            Err(e) => e,
        }
    }
}

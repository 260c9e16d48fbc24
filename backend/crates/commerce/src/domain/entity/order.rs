//! Order Entity

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::entity::customer::Customer;
use crate::domain::entity::product::Product;
use crate::domain::value_object::{
    CustomerId, OrderId, ProductId, money::Money, order_status::OrderStatus,
};
use crate::error::{CommerceError, CommerceResult};

pub const MAX_ORDER_LINES: usize = 50;
pub const MAX_LINE_QUANTITY: u32 = 100;

/// Product snapshot taken when the order was placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_id: OrderId,
    /// Human-facing number from a database sequence
    pub order_number: i64,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Move to `next`, returning the previous status
    pub fn transition(&mut self, next: OrderStatus) -> CommerceResult<OrderStatus> {
        let from = self.status;
        if !from.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition { from, to: next });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(from)
    }

    pub fn is_owned_by(&self, customer_id: &CustomerId) -> bool {
        &self.customer_id == customer_id
    }
}

/// Requested order lines, merged by product
///
/// Lines for the same product are summed; the merged quantity must still be
/// within `1..=MAX_LINE_QUANTITY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLines(Vec<(ProductId, u32)>);

impl OrderLines {
    pub fn new(lines: impl IntoIterator<Item = (ProductId, u32)>) -> AppResult<Self> {
        let mut merged: Vec<(ProductId, u32)> = Vec::new();
        let mut requested = 0usize;

        for (product_id, quantity) in lines {
            requested += 1;
            // bounds the merge scan below as well
            if requested > MAX_ORDER_LINES {
                return Err(line_count_error());
            }
            if quantity == 0 || quantity > MAX_LINE_QUANTITY {
                return Err(quantity_error());
            }
            let total = match merged.iter_mut().find(|(id, _)| *id == product_id) {
                Some((_, existing)) => {
                    *existing += quantity;
                    *existing
                }
                None => {
                    merged.push((product_id, quantity));
                    quantity
                }
            };
            if total > MAX_LINE_QUANTITY {
                return Err(quantity_error());
            }
        }

        if requested == 0 {
            return Err(line_count_error());
        }

        Ok(Self(merged))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn line_count_error() -> AppError {
    AppError::bad_request(format!(
        "An order must have between 1 and {MAX_ORDER_LINES} lines"
    ))
    .with_param("items")
}

fn quantity_error() -> AppError {
    AppError::bad_request(format!(
        "Quantity per product must be between 1 and {MAX_LINE_QUANTITY}"
    ))
    .with_param("items")
}

/// An order ready to be stored; the number is assigned on insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderItem>,
    pub total_amount: Money,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Price `lines` against `products` (looked up by the caller, same order)
    ///
    /// Fails when a product cannot be sold or lacks stock at this moment.
    /// The store re-checks stock when it decrements.
    pub fn price(
        customer: &Customer,
        lines: &OrderLines,
        products: &[Product],
        shipping_address: String,
    ) -> CommerceResult<Self> {
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Money::ZERO;

        for ((product_id, quantity), product) in lines.iter().zip(products) {
            debug_assert_eq!(product_id, product.product_id);
            if !product.status.is_purchasable() {
                return Err(CommerceError::ProductUnavailable(product_id));
            }
            if i64::from(product.stock) < i64::from(quantity) {
                return Err(CommerceError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: product.stock,
                });
            }

            let item = OrderItem {
                product_id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity,
            };
            total = item
                .line_total()
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| {
                    CommerceError::Validation(
                        AppError::bad_request("Order total is too large").with_param("items"),
                    )
                })?;
            items.push(item);
        }

        Ok(Self {
            order_id: OrderId::new(),
            customer_id: customer.customer_id,
            customer_name: customer.full_name.clone(),
            customer_email: customer.email.clone(),
            items,
            total_amount: total,
            shipping_address,
            created_at: Utc::now(),
        })
    }

    pub fn into_order(self, order_number: i64) -> Order {
        Order {
            order_id: self.order_id,
            order_number,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            items: self.items,
            total_amount: self.total_amount,
            status: OrderStatus::Pending,
            shipping_address: self.shipping_address,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::customer::CustomerProfile;
    use crate::domain::entity::product::ProductDraft;
    use crate::domain::value_object::product_status::ProductStatus;

    fn product(price_cents: i64, stock: i64, status: ProductStatus) -> Product {
        Product::new(
            ProductDraft::new("Mug", None, "Kitchen", Money::from_cents(price_cents), stock, status)
                .unwrap(),
        )
    }

    fn customer() -> Customer {
        Customer::new(
            CustomerId::new(),
            CustomerProfile::new("Ada", "ada@example.com", None, Some("1 Analytical St")).unwrap(),
        )
    }

    #[test]
    fn test_lines_merge_duplicates() {
        let a = ProductId::new();
        let b = ProductId::new();
        let lines = OrderLines::new([(a, 2), (b, 1), (a, 3)]).unwrap();
        assert_eq!(lines.iter().collect::<Vec<_>>(), vec![(a, 5), (b, 1)]);
    }

    #[test]
    fn test_lines_bounds() {
        let a = ProductId::new();
        assert!(OrderLines::new([]).is_err());
        assert!(OrderLines::new([(a, 0)]).is_err());
        assert!(OrderLines::new([(a, 101)]).is_err());
        assert!(OrderLines::new([(a, 60), (a, 41)]).is_err());
        let too_many = (0..=MAX_ORDER_LINES).map(|_| (ProductId::new(), 1));
        assert!(OrderLines::new(too_many).is_err());
        let at_limit = (0..MAX_ORDER_LINES).map(|_| (ProductId::new(), 1));
        assert_eq!(OrderLines::new(at_limit).unwrap().len(), MAX_ORDER_LINES);
    }

    #[test]
    fn test_oversized_request_stops_at_the_line_limit() {
        let consumed = std::cell::Cell::new(0usize);
        let lines = (0..30_000).map(|_| {
            consumed.set(consumed.get() + 1);
            (ProductId::new(), 1)
        });

        let err = OrderLines::new(lines).unwrap_err();
        assert_eq!(err.param(), Some("items"));
        assert_eq!(consumed.get(), MAX_ORDER_LINES + 1);
    }

    #[test]
    fn test_price_computes_total() {
        let mug = product(1250, 10, ProductStatus::Active);
        let lamp = product(3000, 1, ProductStatus::Active);
        let lines = OrderLines::new([(mug.product_id, 3), (lamp.product_id, 1)]).unwrap();
        let products: Vec<Product> = lines
            .iter()
            .map(|(id, _)| if id == mug.product_id { mug.clone() } else { lamp.clone() })
            .collect();

        let order = NewOrder::price(&customer(), &lines, &products, "here".into()).unwrap();
        assert_eq!(order.total_amount.cents(), 3 * 1250 + 3000);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.customer_email, "ada@example.com");
    }

    #[test]
    fn test_price_rejects_unavailable_and_short_stock() {
        let draft = product(100, 5, ProductStatus::Draft);
        let lines = OrderLines::new([(draft.product_id, 1)]).unwrap();
        let err = NewOrder::price(&customer(), &lines, &[draft], "here".into()).unwrap_err();
        assert!(matches!(err, CommerceError::ProductUnavailable(_)));

        let scarce = product(100, 2, ProductStatus::Active);
        let lines = OrderLines::new([(scarce.product_id, 3)]).unwrap();
        let err = NewOrder::price(&customer(), &lines, &[scarce], "here".into()).unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InsufficientStock { requested: 3, available: 2, .. }
        ));
    }

    #[test]
    fn test_transition() {
        let mug = product(1250, 10, ProductStatus::Active);
        let lines = OrderLines::new([(mug.product_id, 1)]).unwrap();
        let mut order = NewOrder::price(&customer(), &lines, &[mug], "here".into())
            .unwrap()
            .into_order(1);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.transition(OrderStatus::Processing).unwrap(), OrderStatus::Pending);
        let err = order.transition(OrderStatus::Delivered).unwrap_err();
        assert!(matches!(
            err,
            CommerceError::InvalidStatusTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Delivered
            }
        ));
    }
}

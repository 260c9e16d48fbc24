//! List definitions
//!
//! Column names here are the only identifiers list SQL ever contains.

use listing::{FieldKind, FilterField, ListDefinition, PaginationPolicy, SearchTargets, SortField};

use crate::domain::value_object::{
    customer_status::CustomerStatus, order_status::OrderStatus, product_status::ProductStatus,
};

pub const PRODUCTS: ListDefinition = ListDefinition {
    items_key: "products",
    total_key: "totalProducts",
    filters: &[
        FilterField::new("status", "status", FieldKind::Enum(ProductStatus::CODES)),
        FilterField::new("price", "price_cents", FieldKind::Money),
        FilterField::new("stock", "stock", FieldKind::Integer),
        FilterField::new("createdAt", "created_at", FieldKind::Date),
    ],
    sort_fields: &[
        SortField::new("createdAt", "created_at"),
        SortField::new("name", "name"),
        SortField::new("price", "price_cents"),
        SortField::new("stock", "stock"),
    ],
    default_sort_column: "created_at",
    search: Some(SearchTargets {
        text_columns: &["name", "description", "category"],
        numeric_column: None,
    }),
    pagination: PaginationPolicy::new(10, 50),
    tiebreaker: "product_id",
};

/// Admin view over every order
pub const ORDERS: ListDefinition = ListDefinition {
    items_key: "orders",
    total_key: "totalOrders",
    filters: &[
        FilterField::new("status", "status", FieldKind::Enum(OrderStatus::CODES)),
        FilterField::new("totalAmount", "total_amount_cents", FieldKind::Money),
        FilterField::new("orderDate", "created_at", FieldKind::Date),
    ],
    sort_fields: &[
        SortField::new("createdAt", "created_at"),
        SortField::new("totalAmount", "total_amount_cents"),
        SortField::new("status", "status"),
        SortField::new("orderNumber", "order_number"),
    ],
    default_sort_column: "created_at",
    search: Some(SearchTargets {
        text_columns: &["customer_name", "customer_email"],
        numeric_column: Some("order_number"),
    }),
    pagination: PaginationPolicy::new(10, 100),
    tiebreaker: "order_id",
};

/// A customer's own orders; always scoped to `customer_id`
pub const MY_ORDERS: ListDefinition = ListDefinition {
    filters: &[FilterField::new(
        "status",
        "status",
        FieldKind::Enum(OrderStatus::CODES),
    )],
    sort_fields: &[
        SortField::new("createdAt", "created_at"),
        SortField::new("totalAmount", "total_amount_cents"),
    ],
    search: None,
    pagination: PaginationPolicy::new(5, 10),
    ..ORDERS
};

pub const CUSTOMERS: ListDefinition = ListDefinition {
    items_key: "customers",
    total_key: "totalCustomers",
    filters: &[
        FilterField::new("status", "status", FieldKind::Enum(CustomerStatus::CODES)),
        FilterField::new("registrationDate", "created_at", FieldKind::Date),
    ],
    sort_fields: &[
        SortField::new("createdAt", "created_at"),
        SortField::new("name", "full_name"),
        SortField::new("email", "email"),
    ],
    default_sort_column: "created_at",
    search: Some(SearchTargets {
        text_columns: &["full_name", "email", "phone"],
        numeric_column: None,
    }),
    pagination: PaginationPolicy::new(10, 50),
    tiebreaker: "customer_id",
};

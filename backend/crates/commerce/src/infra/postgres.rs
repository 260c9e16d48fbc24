//! PostgreSQL Repository Implementation
//!
//! Money is stored as integer cents (`*_cents BIGINT`), statuses as their
//! lowercase codes and order lines as a JSONB snapshot.

use chrono::{DateTime, Utc};
use listing::{ListQuery, PageResult, PgListSource, SqlTable, execute_list};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{
    customer::Customer,
    order::{NewOrder, Order, OrderItem},
    product::Product,
};
use crate::domain::repository::{CustomerRepository, OrderRepository, ProductRepository};
use crate::domain::value_object::{
    CustomerId, OrderId, ProductId, customer_status::CustomerStatus, money::Money,
    order_status::OrderStatus, product_status::ProductStatus,
};
use crate::error::{CommerceError, CommerceResult};

const PRODUCTS: SqlTable = SqlTable {
    name: "products",
    columns: "product_id, name, description, category, price_cents, stock, status, \
              image_path, created_at, updated_at",
};

const CUSTOMERS: SqlTable = SqlTable {
    name: "customers",
    columns: "customer_id, full_name, email, phone, address, status, created_at, updated_at",
};

const ORDERS: SqlTable = SqlTable {
    name: "orders",
    columns: "order_id, order_number, customer_id, customer_name, customer_email, items, \
              total_amount_cents, status, shipping_address, created_at, updated_at",
};

/// PostgreSQL-backed catalog, customer and order repository
#[derive(Clone)]
pub struct PgCommerceRepository {
    pool: PgPool,
}

impl PgCommerceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Decrement stock for one line, explaining why when it cannot be served
    async fn take_stock(
        tx: &mut Transaction<'static, Postgres>,
        product_id: ProductId,
        quantity: u32,
    ) -> CommerceResult<()> {
        let taken = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = $3
            WHERE product_id = $1 AND status = $4 AND stock >= $2
            RETURNING stock
            "#,
        )
        .bind(product_id.as_uuid())
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .bind(Utc::now())
        .bind(ProductStatus::Active.code())
        .fetch_optional(&mut **tx)
        .await?;

        if taken.is_some() {
            return Ok(());
        }

        let current = sqlx::query_as::<_, (String, i32)>(
            "SELECT status, stock FROM products WHERE product_id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;

        Err(match current {
            None => CommerceError::ProductNotFound,
            Some((status, _)) if status != ProductStatus::Active.code() => {
                CommerceError::ProductUnavailable(product_id)
            }
            Some((_, available)) => CommerceError::InsufficientStock {
                product_id,
                requested: quantity,
                available,
            },
        })
    }

    /// Put an order's items back on the shelf; deleted products are skipped
    async fn restock(tx: &mut Transaction<'static, Postgres>, order: &Order) -> CommerceResult<()> {
        let now = Utc::now();
        for item in &order.items {
            sqlx::query(
                "UPDATE products SET stock = stock + $2, updated_at = $3 WHERE product_id = $1",
            )
            .bind(item.product_id.as_uuid())
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Conditional status write inside `tx`
    async fn write_status(
        tx: &mut Transaction<'static, Postgres>,
        order: &Order,
        from: OrderStatus,
    ) -> CommerceResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE order_id = $1 AND status = $4
            "#,
        )
        .bind(order.order_id.as_uuid())
        .bind(order.status.code())
        .bind(order.updated_at)
        .bind(from.code())
        .execute(&mut **tx)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }
}

// ============================================================================
// Product Repository Implementation
// ============================================================================

impl ProductRepository for PgCommerceRepository {
    async fn create(&self, product: &Product) -> CommerceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id,
                name,
                description,
                category,
                price_cents,
                stock,
                status,
                image_path,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.product_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.status.code())
        .bind(&product.image_path)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, product_id: &ProductId) -> CommerceResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE product_id = $1",
            PRODUCTS.columns
        ))
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    async fn update(&self, product: &Product) -> CommerceResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                category = $4,
                price_cents = $5,
                stock = $6,
                status = $7,
                image_path = $8,
                updated_at = $9
            WHERE product_id = $1
            "#,
        )
        .bind(product.product_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.status.code())
        .bind(&product.image_path)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(CommerceError::ProductNotFound);
        }
        Ok(())
    }

    async fn delete(&self, product_id: &ProductId) -> CommerceResult<bool> {
        let deleted = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(product_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Product>> {
        let source = PgListSource::<ProductRow>::new(self.pool.clone(), PRODUCTS);
        execute_list(&source, query)
            .await?
            .try_map(ProductRow::into_product)
    }
}

// ============================================================================
// Customer Repository Implementation
// ============================================================================

impl CustomerRepository for PgCommerceRepository {
    async fn find_by_id(&self, customer_id: &CustomerId) -> CommerceResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE customer_id = $1",
            CUSTOMERS.columns
        ))
        .bind(customer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    async fn upsert(&self, customer: &Customer) -> CommerceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id,
                full_name,
                email,
                phone,
                address,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (customer_id) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(customer.customer_id.as_uuid())
        .bind(&customer.full_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.status.code())
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, customer_id: &CustomerId) -> CommerceResult<bool> {
        let deleted = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Customer>> {
        let source = PgListSource::<CustomerRow>::new(self.pool.clone(), CUSTOMERS);
        execute_list(&source, query)
            .await?
            .try_map(CustomerRow::into_customer)
    }
}

// ============================================================================
// Order Repository Implementation
// ============================================================================

impl OrderRepository for PgCommerceRepository {
    async fn place(&self, order: &NewOrder) -> CommerceResult<Order> {
        let mut tx = self.pool.begin().await?;

        for item in &order.items {
            Self::take_stock(&mut tx, item.product_id, item.quantity).await?;
        }

        let order_number = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO orders (
                order_id,
                customer_id,
                customer_name,
                customer_email,
                items,
                total_amount_cents,
                status,
                shipping_address,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING order_number
            "#,
        )
        .bind(order.order_id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(Json(&order.items))
        .bind(order.total_amount.cents())
        .bind(OrderStatus::Pending.code())
        .bind(&order.shipping_address)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order.clone().into_order(order_number))
    }

    async fn find_by_id(&self, order_id: &OrderId) -> CommerceResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE order_id = $1",
            ORDERS.columns
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    async fn update_status(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool> {
        let mut tx = self.pool.begin().await?;
        let applied = Self::write_status(&mut tx, order, from).await?;
        tx.commit().await?;
        Ok(applied)
    }

    async fn cancel(&self, order: &Order, from: OrderStatus) -> CommerceResult<bool> {
        let mut tx = self.pool.begin().await?;

        if !Self::write_status(&mut tx, order, from).await? {
            return Ok(false);
        }
        Self::restock(&mut tx, order).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, order: &Order) -> CommerceResult<bool> {
        let mut tx = self.pool.begin().await?;

        // The stored status decides whether stock comes back
        let status = sqlx::query_scalar::<_, String>(
            "DELETE FROM orders WHERE order_id = $1 RETURNING status",
        )
        .bind(order.order_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(status) = status else {
            return Ok(false);
        };
        if parse_order_status(&status)?.is_open() {
            Self::restock(&mut tx, order).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn has_open_orders(&self, customer_id: &CustomerId) -> CommerceResult<bool> {
        let open: Vec<&str> = OrderStatus::CODES
            .iter()
            .copied()
            .filter(|code| OrderStatus::from_code(code).is_some_and(|s| s.is_open()))
            .collect();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE customer_id = $1 AND status = ANY($2))",
        )
        .bind(customer_id.as_uuid())
        .bind(open.as_slice())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(&self, query: &ListQuery) -> CommerceResult<PageResult<Order>> {
        let source = PgListSource::<OrderRow>::new(self.pool.clone(), ORDERS);
        execute_list(&source, query)
            .await?
            .try_map(OrderRow::into_order)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    name: String,
    description: Option<String>,
    category: String,
    price_cents: i64,
    stock: i32,
    status: String,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> CommerceResult<Product> {
        let status = ProductStatus::from_code(&self.status).ok_or_else(|| {
            CommerceError::Internal(format!("Invalid product status: {}", self.status))
        })?;

        Ok(Product {
            product_id: ProductId::from_uuid(self.product_id),
            name: self.name,
            description: self.description,
            category: self.category,
            price: Money::from_cents(self.price_cents),
            stock: self.stock,
            status,
            image_path: self.image_path,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    customer_id: Uuid,
    full_name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> CommerceResult<Customer> {
        let status = CustomerStatus::from_code(&self.status).ok_or_else(|| {
            CommerceError::Internal(format!("Invalid customer status: {}", self.status))
        })?;

        Ok(Customer {
            customer_id: CustomerId::from_uuid(self.customer_id),
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    order_number: i64,
    customer_id: Uuid,
    customer_name: String,
    customer_email: String,
    items: Json<Vec<OrderItem>>,
    total_amount_cents: i64,
    status: String,
    shipping_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> CommerceResult<Order> {
        Ok(Order {
            order_id: OrderId::from_uuid(self.order_id),
            order_number: self.order_number,
            customer_id: CustomerId::from_uuid(self.customer_id),
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            items: self.items.0,
            total_amount: Money::from_cents(self.total_amount_cents),
            status: parse_order_status(&self.status)?,
            shipping_address: self.shipping_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_order_status(code: &str) -> CommerceResult<OrderStatus> {
    OrderStatus::from_code(code)
        .ok_or_else(|| CommerceError::Internal(format!("Invalid order status: {code}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::lists;
    use listing::ListParams;
    use listing::sql::{count_query, page_query};

    #[test]
    fn test_product_list_reads_the_products_table() {
        let query = lists::PRODUCTS.build(&ListParams::default()).unwrap();
        let page = page_query(&PRODUCTS, &query);
        let sql = page.sql();
        assert!(sql.starts_with(
            "SELECT product_id, name, description, category, price_cents, stock, status, "
        ));
        assert!(sql.contains(" FROM products WHERE TRUE ORDER BY created_at DESC, product_id DESC"));
        assert_eq!(
            count_query(&PRODUCTS, &query).sql(),
            "SELECT COUNT(*) FROM products WHERE TRUE"
        );
    }

    #[test]
    fn test_customer_and_order_tables() {
        let customers = lists::CUSTOMERS.build(&ListParams::default()).unwrap();
        assert!(page_query(&CUSTOMERS, &customers).sql().contains(" FROM customers "));
        let orders = lists::ORDERS.build(&ListParams::default()).unwrap();
        assert!(page_query(&ORDERS, &orders).sql().contains(" FROM orders "));
    }
}

//! Order repository and the checkout write phase.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cartwright_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, Quantity, UserId};

use super::{OrderStore, PlaceOrder, RepositoryError};
use crate::models::{NewOrder, Order, OrderDetail, OrderItem};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: String,
    total_amount: Price,
    shipping_address: Option<String>,
    billing_address: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            status,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address,
            billing_address: row.billing_address,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: Quantity,
    price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DeletedLineRow {
    product_id: ProductId,
    quantity: Quantity,
}

const ORDER_COLUMNS: &str =
    "id, user_id, status, total_amount, shipping_address, billing_address, created_at";

/// `PostgreSQL` order repository.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderRepository {
    async fn place_order(&self, order: &NewOrder) -> Result<PlaceOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO storefront.order (user_id, status, total_amount, shipping_address, billing_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.total_amount)
        .bind(&order.shipping_address)
        .bind(&order.billing_address)
        .fetch_one(&mut *tx)
        .await?;
        let placed = Order::try_from(row)?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO storefront.order_item (order_id, product_id, quantity, price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(placed.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        // Row locks taken here make a concurrent checkout of the same cart
        // wait for this transaction, then see nothing left to delete.
        let deleted = sqlx::query_as::<_, DeletedLineRow>(
            "DELETE FROM storefront.cart_item
             WHERE cart_id = $1
             RETURNING product_id, quantity",
        )
        .bind(order.cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if deleted.is_empty() {
            tx.rollback().await?;
            return Ok(PlaceOrder::CartEmptied);
        }

        let mut consumed: Vec<(ProductId, Quantity)> = deleted
            .into_iter()
            .map(|r| (r.product_id, r.quantity))
            .collect();
        if !order.matches_lines(&mut consumed) {
            tx.rollback().await?;
            return Ok(PlaceOrder::CartChanged);
        }

        tx.commit().await?;
        Ok(PlaceOrder::Placed(placed))
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order
             WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };
        let order = Order::try_from(row)?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, product_id, quantity, price
             FROM storefront.order_item
             WHERE order_id = $1
             ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order,
            items: items.into_iter().map(OrderItem::from).collect(),
        }))
    }
}

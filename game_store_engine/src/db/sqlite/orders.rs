use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{Money, Order, OrderStatusType};

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_open_cart(customer_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 AND status = 'Cart' AND deleted_at IS NULL")
            .bind(customer_id)
            .fetch_optional(conn)
            .await?;
    Ok(order)
}

/// Checked-out orders for the customer, newest first.
pub async fn fetch_orders_for_customer(
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE customer_id = $1 AND status <> 'Cart' AND deleted_at IS NULL
        ORDER BY finalized_at DESC, id DESC
        "#,
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Returns the id of the customer's open cart, creating it if necessary.
///
/// The insert is the first statement so that, inside a transaction, the write lock is taken before anything is read.
/// The partial unique index on open carts turns a concurrent creation into a no-op.
pub async fn ensure_open_cart(customer_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let inserted = sqlx::query("INSERT INTO orders (customer_id, status) VALUES ($1, 'Cart') ON CONFLICT DO NOTHING")
        .bind(customer_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if inserted > 0 {
        debug!("🛒️ Opened a new cart for customer #{customer_id}");
    }
    let id: i64 = sqlx::query_scalar(
        "SELECT id FROM orders WHERE customer_id = $1 AND status = 'Cart' AND deleted_at IS NULL",
    )
    .bind(customer_id)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Moves the customer's open cart to `PendingPayment` and returns its id. `None` means there was no open cart.
///
/// This is a conditional update, so when two transactions race to check out the same cart, only the first sees a
/// row.
pub async fn freeze_open_cart(customer_id: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"
        UPDATE orders SET status = 'PendingPayment', updated_at = CURRENT_TIMESTAMP
        WHERE customer_id = $1 AND status = 'Cart' AND deleted_at IS NULL
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

pub async fn set_final_total(id: i64, total: Money, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET total_price = $1, finalized_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(total)
    .bind(id)
    .fetch_one(conn)
    .await?;
    trace!("📦️ Order #{id} finalized with a total of {total}");
    Ok(order)
}

/// Sets the status of the order to `to`, but only if it is currently `from`. Returns the updated order, or `None` if
/// the order was not in the `from` state (or does not exist).
pub async fn transition_status(
    id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND status = $3 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(to.to_string())
    .bind(id)
    .bind(from.to_string())
    .fetch_optional(conn)
    .await?;
    if order.is_some() {
        trace!("📦️ Order #{id} moved from {from} to {to}");
    }
    Ok(order)
}

use sqlx::SqliteConnection;

use crate::db_types::{GameInfo, OrderLine};

const LINE_QUERY: &str = r#"
    SELECT order_lines.id, order_lines.order_id, order_lines.game_id, games.title, order_lines.quantity,
        order_lines.unit_price, order_lines.created_at
    FROM order_lines JOIN games ON games.id = order_lines.game_id
"#;

/// Inserts a single-unit line at the game's current price. Returns `None` if the game is already on the order.
pub async fn insert_line(
    order_id: i64,
    game: &GameInfo,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, sqlx::Error> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO order_lines (order_id, game_id, quantity, unit_price) VALUES ($1, $2, 1, $3)
        ON CONFLICT (order_id, game_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(order_id)
    .bind(game.id)
    .bind(game.price)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

pub async fn fetch_line(id: i64, conn: &mut SqliteConnection) -> Result<Option<OrderLine>, sqlx::Error> {
    let line = sqlx::query_as(&format!("{LINE_QUERY} WHERE order_lines.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(line)
}

pub async fn fetch_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as(&format!("{LINE_QUERY} WHERE order_lines.order_id = $1 ORDER BY order_lines.id"))
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

/// Deletes lines from an order, but only while the order is still an open cart. With `game_id` set, only that game's
/// line is removed. Returns the number of deleted lines.
pub async fn delete_cart_lines(
    order_id: i64,
    game_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM order_lines
        WHERE order_id = $1
          AND ($2 IS NULL OR game_id = $2)
          AND EXISTS (SELECT 1 FROM orders WHERE orders.id = $1 AND orders.status = 'Cart')
        "#,
    )
    .bind(order_id)
    .bind(game_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

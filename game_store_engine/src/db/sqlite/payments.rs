use sqlx::SqliteConnection;

use crate::db_types::{NewPayment, Payment, PaymentConfirmation};

pub async fn fetch_latest_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn fetch_pending_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1 AND status = 'Pending'")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Inserts a `Pending` payment. A unique-constraint violation here means another pending payment already exists for
/// the order (or, very unlikely, the external reference collided).
pub async fn insert_pending(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
        INSERT INTO payments (order_id, amount, status, provider, external_ref, provider_payload)
        VALUES ($1, $2, 'Pending', $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.provider)
    .bind(payment.external_ref)
    .bind(payment.provider_payload)
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

/// Marks the order's pending payment as `Paid`. Returns `None` if there is no pending payment.
pub async fn settle_pending(
    order_id: i64,
    confirmation: &PaymentConfirmation,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
        UPDATE payments SET
            status = 'Paid',
            provider_ref = COALESCE($1, provider_ref),
            payment_type = COALESCE($2, payment_type),
            provider_payload = $3,
            paid_at = CURRENT_TIMESTAMP,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $4 AND status = 'Pending'
        RETURNING *
        "#,
    )
    .bind(confirmation.provider_ref.as_deref())
    .bind(confirmation.payment_type.as_deref())
    .bind(confirmation.payload.as_str())
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Marks the order's pending payment as `Failed`. Returns `None` if there is no pending payment.
pub async fn fail_pending(
    order_id: i64,
    confirmation: &PaymentConfirmation,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
        UPDATE payments SET
            status = 'Failed',
            provider_ref = COALESCE($1, provider_ref),
            payment_type = COALESCE($2, payment_type),
            provider_payload = $3,
            updated_at = CURRENT_TIMESTAMP
        WHERE order_id = $4 AND status = 'Pending'
        RETURNING *
        "#,
    )
    .bind(confirmation.provider_ref.as_deref())
    .bind(confirmation.payment_type.as_deref())
    .bind(confirmation.payload.as_str())
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

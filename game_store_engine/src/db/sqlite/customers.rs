use sqlx::SqliteConnection;

use crate::db_types::Customer;

/// Soft-deleted customers are treated as unknown.
pub async fn fetch_customer_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as(
        r#"
        SELECT
            customers.id,
            customers.account_id,
            customers.display_name,
            accounts.banned_at IS NOT NULL AS banned
        FROM customers JOIN accounts ON accounts.id = customers.account_id
        WHERE customers.account_id = $1 AND customers.deleted_at IS NULL
        "#,
    )
    .bind(account_id)
    .fetch_optional(conn)
    .await?;
    Ok(customer)
}

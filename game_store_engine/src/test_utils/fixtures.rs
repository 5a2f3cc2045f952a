use gsp_common::Money;

use crate::{helpers::notification_signature, payment_objects::PaymentNotification, SqliteDatabase};

/// Seeds the collaborator tables (accounts, customers, games) that the payment core only reads.
pub struct StoreFixture<'a> {
    db: &'a SqliteDatabase,
}

impl<'a> StoreFixture<'a> {
    pub fn new(db: &'a SqliteDatabase) -> Self {
        Self { db }
    }

    /// Creates an account with a linked customer. Returns `(account_id, customer_id)`.
    pub async fn customer(&self, email: &str) -> (i64, i64) {
        let account_id: i64 = sqlx::query_scalar("INSERT INTO accounts (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(self.db.pool())
            .await
            .expect("Error inserting account");
        let customer_id: i64 =
            sqlx::query_scalar("INSERT INTO customers (account_id, display_name) VALUES ($1, $2) RETURNING id")
                .bind(account_id)
                .bind(email)
                .fetch_one(self.db.pool())
                .await
                .expect("Error inserting customer");
        (account_id, customer_id)
    }

    /// Creates an account without a customer profile
    pub async fn account_only(&self, email: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO accounts (email) VALUES ($1) RETURNING id")
            .bind(email)
            .fetch_one(self.db.pool())
            .await
            .expect("Error inserting account")
    }

    pub async fn ban(&self, account_id: i64) {
        sqlx::query("UPDATE accounts SET banned_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(account_id)
            .execute(self.db.pool())
            .await
            .expect("Error banning account");
    }

    /// Inserts a game with an explicit id, so that tests can refer to games by number
    pub async fn game(&self, id: i64, title: &str, price: Money) {
        sqlx::query("INSERT INTO games (id, title, price) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(title)
            .bind(price)
            .execute(self.db.pool())
            .await
            .expect("Error inserting game");
    }

    pub async fn set_price(&self, id: i64, price: Money) {
        sqlx::query("UPDATE games SET price = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
            .bind(price)
            .bind(id)
            .execute(self.db.pool())
            .await
            .expect("Error updating game price");
    }

    pub async fn delete_game(&self, id: i64) {
        sqlx::query("UPDATE games SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await
            .expect("Error deleting game");
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(self.db.pool()).await.expect("Error running count query")
    }
}

/// Builds a notification signed with `server_key`, as the provider would send it.
pub fn signed_notification(
    external_ref: &str,
    transaction_status: &str,
    fraud_status: Option<&str>,
    gross_amount: &str,
    server_key: &str,
) -> PaymentNotification {
    let status_code = match transaction_status {
        "settlement" | "capture" => "200",
        "pending" => "201",
        _ => "202",
    };
    PaymentNotification {
        order_id: external_ref.to_string(),
        status_code: status_code.to_string(),
        gross_amount: gross_amount.to_string(),
        signature_key: notification_signature(external_ref, status_code, gross_amount, server_key),
        transaction_status: transaction_status.to_string(),
        fraud_status: fraud_status.map(String::from),
        transaction_id: Some(format!("txn-{external_ref}")),
        payment_type: Some("bank_transfer".to_string()),
    }
}

//! # Game store public API
//!
//! Each API wraps a storage backend that implements the traits it needs, so callers can mix and match:
//!
//! * [`cart_api`] manages the customer's open cart.
//! * [`order_flow_api`] freezes a cart into a payable order.
//! * [`accounts_api`] answers questions about a customer's orders and library.
//! * [`payment_api`] opens hosted payment sessions with a [`PaymentProvider`](crate::PaymentProvider).
//! * [`reconciliation_api`] applies asynchronous payment provider callbacks to orders.
//!
//! ```rust,ignore
//! use game_store_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/game_store.db", 25).await?;
//! let api = CartApi::new(db);
//! let line = api.add_item(account_id, game_id).await?;
//! ```
use crate::{db_types::Customer, traits::CustomerDirectory, StoreError};

pub mod accounts_api;
pub mod cart_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_api;
pub mod payment_objects;
pub mod reconciliation_api;

pub(crate) async fn resolve_customer<B: CustomerDirectory>(db: &B, account_id: i64) -> Result<Customer, StoreError> {
    db.fetch_customer_for_account(account_id).await?.ok_or(StoreError::CustomerNotFound(account_id))
}

//! Game Store Engine
//!
//! The checkout and payment reconciliation core of the game store. It turns a customer's mutable cart into an
//! immutable, payable order, opens hosted payment sessions for it, and reconciles the payment provider's asynchronous
//! callbacks against it. The guarantees are that a customer is never granted a game they did not pay for, never has
//! two live payment sessions for one order, and never receives the same game twice.
//!
//! The library is divided into these sections:
//! 1. Storage ([`traits`] and [`SqliteDatabase`]). The APIs only talk to the traits; the SQLite backend implements
//!    them all, with every multi-row change in a single transaction.
//! 2. The public API ([`CartApi`], [`OrderFlowApi`], [`AccountApi`], [`PaymentApi`], [`ReconciliationApi`]).
//! 3. Payment providers ([`PaymentProvider`], with the [`SnapClient`] HTTP implementation).
//!
//! The engine also emits events when orders are paid or fail. See [`events`].
mod db;
mod errors;
mod store_api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod payment_provider;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::traits;
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use errors::{ErrorKind, StoreError};
pub use payment_provider::{PaymentProvider, PaymentProviderError, SnapClient, SnapConfig};
pub use store_api::{
    accounts_api::AccountApi,
    cart_api::CartApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_api::PaymentApi,
    payment_objects,
    reconciliation_api::ReconciliationApi,
};

//! # Storage backend contracts
//!
//! * [`CustomerDirectory`] resolves authenticated accounts to customers, including their ban status.
//! * [`CatalogPriceOracle`] looks up current titles and prices for games.
//! * [`OwnershipLedger`] is the authoritative record of which customer owns which game.
//! * [`OrderManagement`] provides read access to orders and their lines.
//! * [`CartManagement`] mutates the single open cart of a customer and performs checkout.
//! * [`PaymentGatewayDatabase`] records payment sessions and applies provider outcomes to orders.
//!
//! Every multi-row mutation is a single transaction in the backend. If the future is dropped part-way, nothing is
//! written.
mod cart_management;
mod catalog_price_oracle;
mod customer_directory;
mod data_objects;
mod order_management;
mod ownership_ledger;
mod payment_gateway_database;

pub use cart_management::CartManagement;
pub use catalog_price_oracle::CatalogPriceOracle;
pub use customer_directory::CustomerDirectory;
pub use data_objects::TransitionResult;
pub use order_management::OrderManagement;
pub use ownership_ledger::OwnershipLedger;
pub use payment_gateway_database::PaymentGatewayDatabase;

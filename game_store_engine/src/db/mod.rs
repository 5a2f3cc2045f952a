//! #  Database management and control.
//!
//! The [`traits`] module defines the contracts a storage backend must honour to drive the store APIs. [`sqlite`]
//! holds the SQLite backend.
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

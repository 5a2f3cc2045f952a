//! Helpers for tests in this crate and in dependent crates. Enabled by the `test_utils` feature.
mod fake_provider;
mod fixtures;
mod mocks;
pub mod prepare_env;

pub use fake_provider::{FakePaymentProvider, ProviderBehaviour};
pub use fixtures::{signed_notification, StoreFixture};
pub use mocks::MockPaymentProvider;

//! Stateless helpers for talking to payment providers.
mod external_ref;
mod signature;

pub use external_ref::ExternalRef;
pub use signature::{constant_time_eq, notification_signature, verify_notification_signature};

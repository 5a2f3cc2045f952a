//! Post-commit notifications. The reconciler publishes an event after a payment outcome has been durably applied;
//! subscribers (receipt emails, audit logs, analytics) react asynchronously and can never affect the transaction.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLine};

/// An order has been paid and its games granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderPaidEvent {
    pub fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self { order, lines }
    }
}

/// An order's payment expired, was cancelled, or was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailedEvent {
    pub order: Order,
    /// The provider's transaction status that caused the failure
    pub reason: String,
}

impl OrderFailedEvent {
    pub fn new(order: Order, reason: impl Into<String>) -> Self {
        Self { order, reason: reason.into() }
    }
}

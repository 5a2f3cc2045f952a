use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderLine, Payment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    /// The latest payment attempt, if a session was ever opened
    pub payment: Option<Payment>,
}

use crate::db_types::Order;

/// The result of an idempotent order transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The transition was applied. Carries the updated order.
    Applied(Order),
    /// The order was already in a state where the transition is a no-op. Carries the order as it is.
    Unchanged(Order),
}

impl TransitionResult {
    pub fn order(&self) -> &Order {
        match self {
            TransitionResult::Applied(o) | TransitionResult::Unchanged(o) => o,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, TransitionResult::Applied(_))
    }
}

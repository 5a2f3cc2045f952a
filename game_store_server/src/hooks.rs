//! Server-side subscribers to engine events.
use game_store_engine::events::{EventHooks, OrderFailedEvent, OrderPaidEvent};
use log::*;

/// Writes every payment outcome to the `gsp::audit` log target.
pub fn audit_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_paid(|ev: OrderPaidEvent| {
            Box::pin(async move {
                let games = ev.lines.iter().map(|l| l.game_id.to_string()).collect::<Vec<_>>().join(",");
                info!(
                    target: "gsp::audit",
                    "📬️ Order #{} paid by customer #{}. Total {}. Games [{games}]",
                    ev.order.id, ev.order.customer_id, ev.order.total_price.unwrap_or_default()
                );
            })
        })
        .on_order_failed(|ev: OrderFailedEvent| {
            Box::pin(async move {
                info!(
                    target: "gsp::audit",
                    "📬️ Order #{} for customer #{} failed ({})",
                    ev.order.id, ev.order.customer_id, ev.reason
                );
            })
        });
    hooks
}

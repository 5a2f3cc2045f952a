use std::fmt::Debug;

use gsp_common::Secret;
use log::*;

use crate::{
    db_types::{Money, Order, PaymentConfirmation},
    events::{EventProducers, OrderFailedEvent, OrderPaidEvent},
    helpers::{verify_notification_signature, ExternalRef},
    payment_objects::{PaymentNotification, PaymentWebhook, ProviderUpdate, ReconcileAction, ReconcileOutcome},
    traits::{PaymentGatewayDatabase, TransitionResult},
    StoreError,
};

/// `ReconciliationApi` applies asynchronous payment provider callbacks to orders.
///
/// Callbacks may arrive late, out of order, or more than once. Every transition is conditional on the order's current
/// status, so repeating a callback is harmless. A successful payment marks the order and payment paid and grants
/// ownership in one transaction.
///
/// Errors fall in two groups, see [`StoreError::is_transient`]. Transient errors should be reported to the provider
/// as retryable; all others are final and should be acknowledged so the provider stops retrying.
pub struct ReconciliationApi<B> {
    db: B,
    server_key: Secret<String>,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, server_key: Secret<String>, producers: EventProducers) -> Self {
        Self { db, server_key, producers }
    }
}

impl<B> ReconciliationApi<B>
where B: PaymentGatewayDatabase
{
    /// Handles a signed notification. `raw_payload` is the request body as received and is stored for audit.
    pub async fn handle_notification(
        &self,
        notification: &PaymentNotification,
        raw_payload: &str,
    ) -> Result<ReconcileOutcome, StoreError> {
        if self.server_key.is_empty() {
            error!("🔐️ No provider server key is configured. Every payment notification will be rejected.");
            return Err(StoreError::InvalidSignature);
        }
        let n = notification;
        let valid = verify_notification_signature(
            &n.order_id,
            &n.status_code,
            &n.gross_amount,
            self.server_key.reveal(),
            &n.signature_key,
        );
        if !valid {
            warn!("🔐️ Payment notification for {} has an invalid signature. Payload: {raw_payload}", n.order_id);
            return Err(StoreError::InvalidSignature);
        }
        let reference = n.order_id.parse::<ExternalRef>()?;
        let update = ProviderUpdate {
            order_id: reference.order_id(),
            transaction_status: n.transaction_status.clone(),
            fraud_status: n.fraud_status.clone(),
            provider_ref: n.transaction_id.clone(),
            payment_type: n.payment_type.clone(),
            gross_amount: Some(n.gross_amount.clone()),
            raw_payload: raw_payload.to_string(),
        };
        self.apply(update).await
    }

    /// Handles the unsigned webhook variant. The caller is responsible for authenticating the request.
    pub async fn handle_webhook(
        &self,
        webhook: &PaymentWebhook,
        raw_payload: &str,
    ) -> Result<ReconcileOutcome, StoreError> {
        let order_id = webhook
            .order_id
            .order_id()
            .ok_or_else(|| StoreError::InvalidOrderReference(webhook.order_id.to_string()))?;
        let update = ProviderUpdate {
            order_id,
            transaction_status: webhook.transaction_status.clone(),
            fraud_status: webhook.fraud_status.clone(),
            provider_ref: webhook.transaction_id.clone(),
            payment_type: webhook.payment_type.clone(),
            gross_amount: webhook.gross_amount.clone(),
            raw_payload: raw_payload.to_string(),
        };
        self.apply(update).await
    }

    /// Applies a provider outcome to the order, whichever channel it came from.
    pub async fn apply(&self, update: ProviderUpdate) -> Result<ReconcileOutcome, StoreError> {
        let action = ReconcileAction::for_status(&update.transaction_status, update.fraud_status.as_deref());
        trace!("🔄️ Order #{}: '{}' maps to {action:?}", update.order_id, update.transaction_status);
        match action {
            ReconcileAction::Finalize => self.finalize(update).await,
            ReconcileAction::MarkFailed => self.mark_failed(update).await,
            ReconcileAction::NoAction => {
                info!("🔄️ Order #{}: no action for status '{}'", update.order_id, update.transaction_status);
                let ProviderUpdate { order_id, transaction_status, .. } = update;
                Ok(ReconcileOutcome::Ignored { order_id, transaction_status })
            },
        }
    }

    async fn finalize(&self, update: ProviderUpdate) -> Result<ReconcileOutcome, StoreError> {
        let order_id = update.order_id;
        if let Some(gross_amount) = update.gross_amount.as_deref() {
            let notified =
                Money::from_provider_amount(gross_amount).map_err(|e| StoreError::InvalidPayload(e.to_string()))?;
            let order = self.db.fetch_order(order_id).await?.ok_or(StoreError::OrderNotFound(order_id))?;
            if let Some(expected) = order.total_price {
                if expected != notified {
                    error!(
                        "🔄️ Order #{order_id}: provider reports {notified} but the order total is {expected}. Payment \
                         not applied. Payload: {}",
                        update.raw_payload
                    );
                    return Err(StoreError::AmountMismatch { expected, notified });
                }
            }
        }
        let confirmation = confirmation_from(&update);
        match self.db.finalize_payment(order_id, &confirmation).await {
            Ok(TransitionResult::Applied(order)) => {
                info!("🔄️ Order #{order_id} is paid. Ownership has been granted.");
                self.publish_paid(&order).await;
                Ok(ReconcileOutcome::Paid(order))
            },
            Ok(TransitionResult::Unchanged(order)) => {
                info!("🔄️ Order #{order_id} is already paid. Duplicate notification ignored.");
                Ok(ReconcileOutcome::AlreadyPaid(order))
            },
            Err(e @ StoreError::OrderNotPayable { .. }) => {
                error!(
                    "🔄️ Order #{order_id} received a successful payment but cannot be paid. Manual reconciliation is \
                     required. {e}. Payload: {}",
                    update.raw_payload
                );
                Err(e)
            },
            Err(e) => {
                warn!("🔄️ Could not finalize order #{order_id}. {e}. Payload: {}", update.raw_payload);
                Err(e)
            },
        }
    }

    async fn mark_failed(&self, update: ProviderUpdate) -> Result<ReconcileOutcome, StoreError> {
        let order_id = update.order_id;
        let confirmation = confirmation_from(&update);
        match self.db.mark_order_failed(order_id, &confirmation).await? {
            TransitionResult::Applied(order) => {
                info!("🔄️ Order #{order_id} failed ({}).", update.transaction_status);
                self.publish_failed(&order, &update.transaction_status).await;
                Ok(ReconcileOutcome::Failed(order))
            },
            TransitionResult::Unchanged(order) => {
                info!(
                    "🔄️ Order #{order_id} is {} and stays that way. '{}' ignored.",
                    order.status, update.transaction_status
                );
                Ok(ReconcileOutcome::Unchanged(order))
            },
        }
    }

    async fn publish_paid(&self, order: &Order) {
        if self.producers.order_paid_producer.is_empty() {
            return;
        }
        let lines = match self.db.fetch_order_lines(order.id).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!("📬️ Could not load the lines of paid order #{}. No event is published. {e}", order.id);
                return;
            },
        };
        for producer in &self.producers.order_paid_producer {
            debug!("📬️ Notifying order paid hook subscribers");
            producer.publish_event(OrderPaidEvent::new(order.clone(), lines.clone())).await;
        }
    }

    async fn publish_failed(&self, order: &Order, reason: &str) {
        for producer in &self.producers.order_failed_producer {
            debug!("📬️ Notifying order failed hook subscribers");
            producer.publish_event(OrderFailedEvent::new(order.clone(), reason)).await;
        }
    }
}

fn confirmation_from(update: &ProviderUpdate) -> PaymentConfirmation {
    PaymentConfirmation {
        provider_ref: update.provider_ref.clone(),
        payment_type: update.payment_type.clone(),
        payload: update.raw_payload.clone(),
    }
}

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPayment, OrderStatusType},
    helpers::ExternalRef,
    payment_objects::PaymentSessionResult,
    payment_provider::{PaymentProvider, SessionRequest},
    store_api::resolve_customer,
    traits::PaymentGatewayDatabase,
    StoreError,
};

/// `PaymentApi` opens a hosted payment session for a checked-out order and records the pending payment.
pub struct PaymentApi<B, P> {
    db: B,
    provider: P,
}

impl<B, P> Debug for PaymentApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B, P> PaymentApi<B, P> {
    pub fn new(db: B, provider: P) -> Self {
        Self { db, provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<B, P> PaymentApi<B, P>
where
    B: PaymentGatewayDatabase,
    P: PaymentProvider,
{
    /// Opens a payment session for `order_id` on behalf of the account that owns it.
    ///
    /// The order must be awaiting payment and must not already have a pending session. Provider errors are returned
    /// as-is and nothing is recorded. Returns the URL the customer should be redirected to.
    pub async fn create_payment_session(
        &self,
        account_id: i64,
        order_id: i64,
    ) -> Result<PaymentSessionResult, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        let order = self.db.fetch_order(order_id).await?.ok_or(StoreError::OrderNotFound(order_id))?;
        if order.customer_id != customer.id {
            warn!("💳️ Customer #{} asked to pay for order #{order_id}, which is not theirs", customer.id);
            return Err(StoreError::Forbidden(order_id));
        }
        let amount = match (order.status, order.total_price) {
            (OrderStatusType::PendingPayment, Some(total)) => total,
            (status, _) => return Err(StoreError::OrderNotPayable { order_id, status }),
        };
        if self.db.fetch_pending_payment(order_id).await?.is_some() {
            return Err(StoreError::PaymentAlreadyExists(order_id));
        }
        let external_ref = ExternalRef::new(order_id).to_string();
        let request = SessionRequest { external_ref: external_ref.clone(), amount };
        let session = self.provider.create_session(&request).await.map_err(|e| {
            warn!("💳️ Could not open a payment session for order #{order_id}. {e}");
            StoreError::ProviderError(e)
        })?;
        let payment = NewPayment::new(order_id, amount, self.provider.name(), external_ref.as_str())
            .with_payload(session.raw_response.as_str());
        let payment = self.db.insert_pending_payment(payment).await?;
        info!("💳️ Payment session {} opened for order #{order_id} ({amount})", payment.external_ref);
        Ok(PaymentSessionResult {
            order_id,
            external_ref,
            token: session.token,
            redirect_url: session.redirect_url,
        })
    }
}

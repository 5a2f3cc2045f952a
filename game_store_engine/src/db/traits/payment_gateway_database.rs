use crate::{
    db_types::{NewPayment, Payment, PaymentConfirmation},
    traits::{OrderManagement, TransitionResult},
    StoreError,
};

/// Payment bookkeeping and the terminal order transitions driven by provider callbacks.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// The most recent payment attempt for the order.
    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, StoreError>;

    /// The payment attempt for the order that is still `Pending`, if any.
    async fn fetch_pending_payment(&self, order_id: i64) -> Result<Option<Payment>, StoreError>;

    /// Records a new `Pending` payment. At most one pending payment may exist per order; a second one fails with
    /// [`StoreError::PaymentAlreadyExists`].
    async fn insert_pending_payment(&self, payment: NewPayment) -> Result<Payment, StoreError>;

    /// In a single atomic transaction:
    /// * moves the order from `PendingPayment` to `Paid`,
    /// * marks its pending payment as `Paid` with the provider's details,
    /// * grants the customer ownership of every game on the order.
    ///
    /// An order that is already `Paid` is returned [`TransitionResult::Unchanged`]. Any other state is
    /// [`StoreError::OrderNotPayable`], and a missing pending payment is [`StoreError::PaymentNotFound`].
    async fn finalize_payment(
        &self,
        order_id: i64,
        confirmation: &PaymentConfirmation,
    ) -> Result<TransitionResult, StoreError>;

    /// Moves the order from `PendingPayment` to `Failed` and fails its pending payment, recording the provider's
    /// details. Orders in any other state are returned [`TransitionResult::Unchanged`].
    async fn mark_order_failed(
        &self,
        order_id: i64,
        confirmation: &PaymentConfirmation,
    ) -> Result<TransitionResult, StoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

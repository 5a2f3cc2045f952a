use std::fmt::Debug;

use log::*;

use crate::{db_types::Order, store_api::resolve_customer, traits::CartManagement, StoreError};

/// `OrderFlowApi` moves a cart into the payment flow.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: CartManagement
{
    /// Freezes the customer's open cart into an order awaiting payment.
    ///
    /// Errors, in the order they are checked:
    /// * [`StoreError::CustomerNotFound`], [`StoreError::AccountBanned`]
    /// * [`StoreError::NoOpenCart`], including when a concurrent checkout of the same cart won the race
    /// * [`StoreError::EmptyCart`]
    /// * [`StoreError::AlreadyOwned`] if any game in the cart is owned by now. The whole checkout is rejected.
    ///
    /// The cart is unchanged on every error. After a successful checkout the next cart operation opens a new cart.
    pub async fn checkout(&self, account_id: i64) -> Result<Order, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        if customer.banned {
            warn!("📦️ Banned account {account_id} attempted to check out");
            return Err(StoreError::AccountBanned);
        }
        let order = self.db.checkout_open_cart(customer.id).await.map_err(|e| {
            debug!("📦️ Checkout for customer #{} rejected. {e}", customer.id);
            e
        })?;
        info!(
            "📦️ Customer #{} checked out order #{} for {}",
            customer.id,
            order.id,
            order.total_price.unwrap_or_default()
        );
        Ok(order)
    }
}

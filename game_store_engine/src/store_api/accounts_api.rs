use std::fmt::Debug;

use crate::{
    db_types::{Customer, Order, OrderStatusType, OwnedGame},
    order_objects::OrderDetails,
    store_api::resolve_customer,
    traits::PaymentGatewayDatabase,
    StoreError,
};

/// Read-only views of a customer's orders and game library.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: PaymentGatewayDatabase
{
    pub async fn customer(&self, account_id: i64) -> Result<Customer, StoreError> {
        resolve_customer(&self.db, account_id).await
    }

    pub async fn owned_games(&self, account_id: i64) -> Result<Vec<OwnedGame>, StoreError> {
        let customer = self.customer(account_id).await?;
        self.db.list_owned(customer.id).await
    }

    /// Checked-out orders, newest first
    pub async fn orders_for_account(&self, account_id: i64) -> Result<Vec<Order>, StoreError> {
        let customer = self.customer(account_id).await?;
        self.db.fetch_orders_for_customer(customer.id).await
    }

    pub async fn order_status(&self, account_id: i64, order_id: i64) -> Result<OrderStatusType, StoreError> {
        let order = self.owned_order(account_id, order_id).await?;
        Ok(order.status)
    }

    pub async fn order_details(&self, account_id: i64, order_id: i64) -> Result<OrderDetails, StoreError> {
        let order = self.owned_order(account_id, order_id).await?;
        let lines = self.db.fetch_order_lines(order_id).await?;
        let payment = self.db.fetch_payment_for_order(order_id).await?;
        Ok(OrderDetails { order, lines, payment })
    }

    async fn owned_order(&self, account_id: i64, order_id: i64) -> Result<Order, StoreError> {
        let customer = self.customer(account_id).await?;
        let order = self.db.fetch_order(order_id).await?.ok_or(StoreError::OrderNotFound(order_id))?;
        if order.customer_id != customer.id {
            return Err(StoreError::Forbidden(order_id));
        }
        Ok(order)
    }
}

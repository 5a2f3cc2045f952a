use crate::{
    db_types::{Order, OrderLine},
    traits::{CustomerDirectory, OwnershipLedger},
    StoreError,
};

#[allow(async_fn_in_trait)]
pub trait OrderManagement: CustomerDirectory + OwnershipLedger {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError>;

    /// The lines of an order, oldest first.
    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, StoreError>;

    /// The customer's open cart order, if there is one.
    async fn fetch_open_cart(&self, customer_id: i64) -> Result<Option<Order>, StoreError>;

    /// Every order the customer has checked out, newest first. Open carts are excluded.
    async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, StoreError>;
}

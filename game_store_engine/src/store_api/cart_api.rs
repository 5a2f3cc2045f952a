use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    db_types::{Cart, OrderLine},
    store_api::resolve_customer,
    traits::CartManagement,
    StoreError,
};

pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(2);

/// `CartApi` manages the single open cart of each customer.
///
/// A customer can hold one unit of a game, and only games they do not already own. Prices are captured when a game is
/// added and never change afterwards.
pub struct CartApi<B> {
    db: B,
    catalog_timeout: Duration,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, catalog_timeout: DEFAULT_CATALOG_TIMEOUT }
    }

    /// Bounds each catalog price lookup. A lookup that takes longer fails with [`StoreError::Timeout`].
    pub fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub async fn add_item(&self, account_id: i64, game_id: i64) -> Result<OrderLine, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        if let Some(owned) = self.db.first_owned(customer.id, &[game_id]).await? {
            debug!("🛒️ Customer #{} already owns game {owned}", customer.id);
            return Err(StoreError::AlreadyOwned(owned));
        }
        let game = tokio::time::timeout(self.catalog_timeout, self.db.fetch_game_info(game_id))
            .await
            .map_err(|_| StoreError::Timeout("Catalog price lookup".to_string()))??
            .ok_or(StoreError::GameNotFound(game_id))?;
        let line = self.db.add_line_to_open_cart(customer.id, &game).await?;
        info!("🛒️ Customer #{} added '{}' to cart #{} for {}", customer.id, game.title, line.order_id, line.unit_price);
        Ok(line)
    }

    /// Removes the game from the open cart. Removing a game that is not in the cart is not an error; the return value
    /// says whether anything was removed.
    pub async fn remove_item(&self, account_id: i64, game_id: i64) -> Result<bool, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        let removed = self.db.remove_line_from_open_cart(customer.id, game_id).await?;
        if removed {
            info!("🛒️ Customer #{} removed game {game_id} from their cart", customer.id);
        }
        Ok(removed)
    }

    pub async fn clear(&self, account_id: i64) -> Result<u64, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        let removed = self.db.clear_open_cart(customer.id).await?;
        info!("🛒️ Customer #{} cleared {removed} lines from their cart", customer.id);
        Ok(removed)
    }

    /// The open cart with its running total. A customer without an open cart gets an empty cart.
    pub async fn get_cart(&self, account_id: i64) -> Result<Cart, StoreError> {
        let customer = resolve_customer(&self.db, account_id).await?;
        let Some(order) = self.db.fetch_open_cart(customer.id).await? else {
            return Ok(Cart::default());
        };
        let lines = self.db.fetch_order_lines(order.id).await?;
        Ok(Cart::new(order.id, lines))
    }
}

use crate::{
    db_types::{GameInfo, Order, OrderLine},
    traits::{CatalogPriceOracle, OrderManagement},
    StoreError,
};

/// Mutations of the customer's open cart, and the checkout transition that freezes it.
#[allow(async_fn_in_trait)]
pub trait CartManagement: Clone + OrderManagement + CatalogPriceOracle {
    /// Adds a single-unit line for `game` to the customer's open cart, creating the cart if necessary. The line's
    /// price is `game.price` and is never re-read.
    ///
    /// Fails with [`StoreError::DuplicateInCart`] if the game is already a line in the cart.
    async fn add_line_to_open_cart(&self, customer_id: i64, game: &GameInfo) -> Result<OrderLine, StoreError>;

    /// Removes the game from the open cart. Returns `false` if it was not in the cart.
    ///
    /// Fails with [`StoreError::NoOpenCart`] if the customer has no open cart.
    async fn remove_line_from_open_cart(&self, customer_id: i64, game_id: i64) -> Result<bool, StoreError>;

    /// Deletes all lines of the open cart, returning how many were removed.
    ///
    /// Fails with [`StoreError::NoOpenCart`] if the customer has no open cart.
    async fn clear_open_cart(&self, customer_id: i64) -> Result<u64, StoreError>;

    /// Atomically freezes the open cart into a payable order:
    /// * the cart moves from `Cart` to `PendingPayment`. If no cart is open, [`StoreError::NoOpenCart`].
    /// * a cart without lines fails with [`StoreError::EmptyCart`].
    /// * if the customer owns any game in the cart, [`StoreError::AlreadyOwned`].
    /// * the total is the sum of the line snapshot prices, and `finalized_at` is stamped.
    ///
    /// On any failure the cart is left untouched in the `Cart` state. Of two concurrent checkouts of the same cart,
    /// exactly one succeeds.
    async fn checkout_open_cart(&self, customer_id: i64) -> Result<Order, StoreError>;
}

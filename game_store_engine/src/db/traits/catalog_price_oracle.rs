use crate::{db_types::GameInfo, StoreError};

#[allow(async_fn_in_trait)]
pub trait CatalogPriceOracle {
    /// The current title and price of a game. Deleted or unknown games return `None`.
    async fn fetch_game_info(&self, game_id: i64) -> Result<Option<GameInfo>, StoreError>;
}

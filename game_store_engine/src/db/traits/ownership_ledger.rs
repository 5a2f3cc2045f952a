use crate::{db_types::OwnedGame, StoreError};

#[allow(async_fn_in_trait)]
pub trait OwnershipLedger {
    /// Returns the first game in `game_ids` that the customer already owns, if any.
    async fn first_owned(&self, customer_id: i64, game_ids: &[i64]) -> Result<Option<i64>, StoreError>;

    /// Grants ownership of every game in `game_ids`. Games the customer already owns are skipped silently. Returns
    /// the number of new ownership records.
    async fn grant_ownership(&self, customer_id: i64, order_id: Option<i64>, game_ids: &[i64])
        -> Result<u64, StoreError>;

    /// All games the customer owns, oldest grant first.
    async fn list_owned(&self, customer_id: i64) -> Result<Vec<OwnedGame>, StoreError>;
}

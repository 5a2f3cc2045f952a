use crate::{db_types::Customer, StoreError};

#[allow(async_fn_in_trait)]
pub trait CustomerDirectory {
    /// Resolves an authenticated account to its customer record. The `banned` flag reflects the account's state at
    /// the time of the call.
    async fn fetch_customer_for_account(&self, account_id: i64) -> Result<Option<Customer>, StoreError>;
}

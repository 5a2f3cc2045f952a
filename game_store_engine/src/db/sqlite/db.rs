//! `SqliteDatabase` is the SQLite storage backend. It implements every trait in [`crate::traits`].
//!
//! Each write transaction opens with its conditional write, never with a read. SQLite then serialises competing
//! writers through its busy handler instead of failing them on a read-to-write lock upgrade.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{customers, games, new_pool, order_lines, orders, ownership, payments};
use crate::{
    db_types::{
        Customer,
        GameInfo,
        Money,
        NewPayment,
        Order,
        OrderLine,
        OrderStatusType,
        OwnedGame,
        Payment,
        PaymentConfirmation,
    },
    traits::{
        CartManagement,
        CatalogPriceOracle,
        CustomerDirectory,
        OrderManagement,
        OwnershipLedger,
        PaymentGatewayDatabase,
        TransitionResult,
    },
    StoreError,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Already-applied migrations are skipped.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }
}

impl CustomerDirectory for SqliteDatabase {
    async fn fetch_customer_for_account(&self, account_id: i64) -> Result<Option<Customer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_for_account(account_id, &mut conn).await?;
        Ok(customer)
    }
}

impl CatalogPriceOracle for SqliteDatabase {
    async fn fetch_game_info(&self, game_id: i64) -> Result<Option<GameInfo>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let game = games::fetch_game_info(game_id, &mut conn).await?;
        Ok(game)
    }
}

impl OwnershipLedger for SqliteDatabase {
    async fn first_owned(&self, customer_id: i64, game_ids: &[i64]) -> Result<Option<i64>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let owned = ownership::first_owned(customer_id, game_ids, &mut conn).await?;
        Ok(owned)
    }

    async fn grant_ownership(
        &self,
        customer_id: i64,
        order_id: Option<i64>,
        game_ids: &[i64],
    ) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let granted = ownership::grant(customer_id, order_id, game_ids, &mut conn).await?;
        Ok(granted)
    }

    async fn list_owned(&self, customer_id: i64) -> Result<Vec<OwnedGame>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let games = ownership::list_owned(customer_id, &mut conn).await?;
        Ok(games)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_lines(&self, order_id: i64) -> Result<Vec<OrderLine>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let lines = order_lines::fetch_lines(order_id, &mut conn).await?;
        Ok(lines)
    }

    async fn fetch_open_cart(&self, customer_id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_open_cart(customer_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_customer(customer_id, &mut conn).await?;
        Ok(orders)
    }
}

impl CartManagement for SqliteDatabase {
    async fn add_line_to_open_cart(&self, customer_id: i64, game: &GameInfo) -> Result<OrderLine, StoreError> {
        let mut tx = self.pool.begin().await?;
        let order_id = orders::ensure_open_cart(customer_id, &mut tx).await?;
        let line_id =
            order_lines::insert_line(order_id, game, &mut tx).await?.ok_or(StoreError::DuplicateInCart(game.id))?;
        let line = order_lines::fetch_line(line_id, &mut tx).await?.ok_or_else(|| {
            StoreError::database(format!("Order line {line_id} vanished straight after it was inserted"))
        })?;
        tx.commit().await?;
        debug!("🗃️ Game {} added to cart #{order_id} at {}", game.id, game.price);
        Ok(line)
    }

    async fn remove_line_from_open_cart(&self, customer_id: i64, game_id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let cart = orders::fetch_open_cart(customer_id, &mut conn).await?.ok_or(StoreError::NoOpenCart)?;
        let removed = order_lines::delete_cart_lines(cart.id, Some(game_id), &mut conn).await?;
        Ok(removed > 0)
    }

    async fn clear_open_cart(&self, customer_id: i64) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let cart = orders::fetch_open_cart(customer_id, &mut conn).await?.ok_or(StoreError::NoOpenCart)?;
        let removed = order_lines::delete_cart_lines(cart.id, None, &mut conn).await?;
        Ok(removed)
    }

    async fn checkout_open_cart(&self, customer_id: i64) -> Result<Order, StoreError> {
        // Any early return drops `tx`, which rolls the status change back.
        let mut tx = self.pool.begin().await?;
        let order_id = orders::freeze_open_cart(customer_id, &mut tx).await?.ok_or(StoreError::NoOpenCart)?;
        let lines = order_lines::fetch_lines(order_id, &mut tx).await?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        let game_ids = lines.iter().map(|l| l.game_id).collect::<Vec<_>>();
        if let Some(game_id) = ownership::first_owned(customer_id, &game_ids, &mut tx).await? {
            return Err(StoreError::AlreadyOwned(game_id));
        }
        let total = lines
            .iter()
            .map(OrderLine::checked_line_total)
            .try_fold(Money::default(), |total, line| total.checked_add(line?))
            .ok_or(StoreError::TotalOutOfRange(order_id))?;
        let order = orders::set_final_total(order_id, total, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Cart #{order_id} checked out with {} lines", lines.len());
        Ok(order)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_latest_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_pending_payment(&self, order_id: i64) -> Result<Option<Payment>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_pending_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn insert_pending_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let order_id = payment.order_id;
        let mut conn = self.pool.acquire().await?;
        match payments::insert_pending(payment, &mut conn).await {
            Ok(payment) => Ok(payment),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!("🗃️ Pending payment for order #{order_id} rejected by the unique index. {e}");
                Err(StoreError::PaymentAlreadyExists(order_id))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn finalize_payment(
        &self,
        order_id: i64,
        confirmation: &PaymentConfirmation,
    ) -> Result<TransitionResult, StoreError> {
        let mut tx = self.pool.begin().await?;
        let paid =
            orders::transition_status(order_id, OrderStatusType::PendingPayment, OrderStatusType::Paid, &mut tx)
                .await?;
        let Some(order) = paid else {
            let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(StoreError::OrderNotFound(order_id))?;
            return match order.status {
                OrderStatusType::Paid => Ok(TransitionResult::Unchanged(order)),
                status => Err(StoreError::OrderNotPayable { order_id, status }),
            };
        };
        payments::settle_pending(order_id, confirmation, &mut tx).await?.ok_or(StoreError::PaymentNotFound(order_id))?;
        let game_ids =
            order_lines::fetch_lines(order_id, &mut tx).await?.into_iter().map(|l| l.game_id).collect::<Vec<_>>();
        let granted = ownership::grant(order.customer_id, Some(order_id), &game_ids, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} is paid. {granted} ownership records created");
        Ok(TransitionResult::Applied(order))
    }

    async fn mark_order_failed(
        &self,
        order_id: i64,
        confirmation: &PaymentConfirmation,
    ) -> Result<TransitionResult, StoreError> {
        let mut tx = self.pool.begin().await?;
        let failed =
            orders::transition_status(order_id, OrderStatusType::PendingPayment, OrderStatusType::Failed, &mut tx)
                .await?;
        let Some(order) = failed else {
            let order = orders::fetch_order(order_id, &mut tx).await?.ok_or(StoreError::OrderNotFound(order_id))?;
            return Ok(TransitionResult::Unchanged(order));
        };
        if payments::fail_pending(order_id, confirmation, &mut tx).await?.is_none() {
            warn!("🗃️ Order #{order_id} failed without a pending payment on record");
        }
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} marked as failed");
        Ok(TransitionResult::Applied(order))
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

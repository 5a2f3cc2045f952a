use std::collections::HashMap;

use cucumber::World;
use game_store_engine::{
    db_types::Order,
    events::EventProducers,
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        FakePaymentProvider,
        StoreFixture,
    },
    CartApi,
    OrderFlowApi,
    PaymentApi,
    ReconciliationApi,
    SqliteDatabase,
    StoreError,
};
use gsp_common::Secret;
use log::*;

pub const SERVER_KEY: &str = "SB-Mid-server-cucumber";

#[derive(Default, Debug, World)]
pub struct StoreWorld {
    pub system: Option<StoreSystem>,
    /// Account ids by customer name
    pub accounts: HashMap<String, i64>,
    pub last_order: Option<Order>,
    pub last_external_ref: Option<String>,
    pub last_error: Option<StoreError>,
}

#[derive(Debug)]
pub struct StoreSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub cart: CartApi<SqliteDatabase>,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub payments: PaymentApi<SqliteDatabase, FakePaymentProvider>,
    pub reconciler: ReconciliationApi<SqliteDatabase>,
}

impl StoreWorld {
    pub async fn system(&mut self) -> &StoreSystem {
        if self.system.is_none() {
            self.system = Some(StoreSystem::new().await);
        }
        self.system.as_ref().expect("system was just initialised")
    }

    pub fn sys(&self) -> &StoreSystem {
        self.system.as_ref().expect("StoreSystem not initialised")
    }

    pub fn fixture(&self) -> StoreFixture<'_> {
        StoreFixture::new(&self.sys().db)
    }

    pub fn account(&self, name: &str) -> i64 {
        *self.accounts.get(name).unwrap_or_else(|| panic!("No customer called {name}"))
    }

    pub fn order(&self) -> &Order {
        self.last_order.as_ref().expect("No order has been checked out")
    }

    /// Keeps the error for a later `Then` step instead of failing the current one
    pub fn record<T>(&mut self, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Recorded error: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}

impl StoreSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let cart = CartApi::new(db.clone());
        let orders = OrderFlowApi::new(db.clone());
        let payments = PaymentApi::new(db.clone(), FakePaymentProvider::default());
        let reconciler =
            ReconciliationApi::new(db.clone(), Secret::new(SERVER_KEY.to_string()), EventProducers::default());
        Self { db_path: url, db, cart, orders, payments, reconciler }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}

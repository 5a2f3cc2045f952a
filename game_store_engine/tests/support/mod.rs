#![allow(dead_code)]
use game_store_engine::{
    db_types::{Money, Order},
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        FakePaymentProvider,
        StoreFixture,
    },
    CartApi,
    OrderFlowApi,
    PaymentApi,
    SqliteDatabase,
};

pub const SERVER_KEY: &str = "SB-Mid-server-test-key";

pub struct TestStore {
    pub db: SqliteDatabase,
    pub alice: i64,
    pub alice_customer: i64,
    pub bob: i64,
    pub bob_customer: i64,
}

/// A migrated database with two customers (alice, bob) and four games:
/// 7 = 19.99, 9 = 4.99, 11 = 59.99, 13 = 0.00
pub async fn seeded_store() -> TestStore {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    let fixture = StoreFixture::new(&db);
    let (alice, alice_customer) = fixture.customer("alice@example.com").await;
    let (bob, bob_customer) = fixture.customer("bob@example.com").await;
    fixture.game(7, "Starfall Tactics", Money::from(1999)).await;
    fixture.game(9, "Pocket Dungeon", Money::from(499)).await;
    fixture.game(11, "Iron Meridian", Money::from(5999)).await;
    fixture.game(13, "Free Weekend", Money::from(0)).await;
    TestStore { db, alice, alice_customer, bob, bob_customer }
}

/// Puts the given games in the account's cart and checks out.
pub async fn checked_out_order(db: &SqliteDatabase, account_id: i64, games: &[i64]) -> Order {
    let cart = CartApi::new(db.clone());
    for game_id in games {
        cart.add_item(account_id, *game_id).await.expect("Error adding game to cart");
    }
    OrderFlowApi::new(db.clone()).checkout(account_id).await.expect("Error checking out")
}

/// Checks out the games and opens a payment session. Returns the order and its external reference.
pub async fn order_awaiting_payment(db: &SqliteDatabase, account_id: i64, games: &[i64]) -> (Order, String) {
    let order = checked_out_order(db, account_id, games).await;
    let api = PaymentApi::new(db.clone(), FakePaymentProvider::default());
    let session = api.create_payment_session(account_id, order.id).await.expect("Error opening payment session");
    (order, session.external_ref)
}

/// The provider's rendering of an amount: whole minor units with two zero decimals
pub fn provider_amount(amount: Money) -> String {
    format!("{}.00", amount.value())
}

use std::str::FromStr;

use cucumber::{given, then, when};
use game_store_engine::{
    db_types::{Money, OrderStatusType},
    test_utils::signed_notification,
    traits::{CustomerDirectory, OrderManagement, OwnershipLedger},
};

use crate::cucumber::{world::SERVER_KEY, StoreWorld};

fn money(s: &str) -> Money {
    Money::from_str(s).expect("Not a valid amount")
}

#[given(expr = "a customer called {word}")]
async fn a_customer(world: &mut StoreWorld, name: String) {
    world.system().await;
    let (account_id, _) = world.fixture().customer(&format!("{name}@example.com")).await;
    world.accounts.insert(name, account_id);
}

#[given(expr = "game {int} {string} costs {word}")]
async fn a_game(world: &mut StoreWorld, id: i64, title: String, price: String) {
    world.system().await;
    world.fixture().game(id, &title, money(&price)).await;
}

#[given(expr = "{word} is banned")]
async fn banned(world: &mut StoreWorld, name: String) {
    let account_id = world.account(&name);
    world.fixture().ban(account_id).await;
}

#[given(expr = "{word} already owns game {int}")]
async fn already_owns(world: &mut StoreWorld, name: String, game_id: i64) {
    let account_id = world.account(&name);
    let customer = world.sys().db.fetch_customer_for_account(account_id).await.unwrap().expect("No customer");
    world.sys().db.grant_ownership(customer.id, None, &[game_id]).await.unwrap();
}

#[when(expr = "{word} adds game {int} to the cart")]
async fn add_to_cart(world: &mut StoreWorld, name: String, game_id: i64) {
    let account_id = world.account(&name);
    let result = world.sys().cart.add_item(account_id, game_id).await;
    world.record(result);
}

#[when(expr = "{word} removes game {int} from the cart")]
async fn remove_from_cart(world: &mut StoreWorld, name: String, game_id: i64) {
    let account_id = world.account(&name);
    let result = world.sys().cart.remove_item(account_id, game_id).await;
    world.record(result);
}

#[when(expr = "{word} checks out")]
async fn checkout(world: &mut StoreWorld, name: String) {
    let account_id = world.account(&name);
    let result = world.sys().orders.checkout(account_id).await;
    if let Some(order) = world.record(result) {
        world.last_order = Some(order);
    }
}

#[when(expr = "{word} opens a payment session")]
async fn open_session(world: &mut StoreWorld, name: String) {
    let account_id = world.account(&name);
    let order_id = world.order().id;
    let result = world.sys().payments.create_payment_session(account_id, order_id).await;
    if let Some(session) = world.record(result) {
        world.last_external_ref = Some(session.external_ref);
    }
}

#[when(expr = "the provider reports {word} for the order")]
async fn provider_reports(world: &mut StoreWorld, status: String) {
    let external_ref = world.last_external_ref.clone().expect("No payment session has been opened");
    let total = world.order().total_price.expect("Order has no total");
    let amount = format!("{}.00", total.value());
    let notification = signed_notification(&external_ref, &status, None, &amount, SERVER_KEY);
    let raw = serde_json::to_string(&notification).expect("Error serializing notification");
    let result = world.sys().reconciler.handle_notification(&notification, &raw).await;
    world.record(result);
}

#[then(expr = "the cart of {word} holds {int} game(s) totalling {word}")]
async fn cart_total(world: &mut StoreWorld, name: String, count: usize, total: String) {
    let account_id = world.account(&name);
    let cart = world.sys().cart.get_cart(account_id).await.expect("Error fetching cart");
    assert_eq!(cart.lines.len(), count);
    assert_eq!(cart.total, money(&total));
}

#[then(expr = "the operation fails with {word}")]
async fn fails_with(world: &mut StoreWorld, kind: String) {
    let err = world.last_error.as_ref().expect("The last operation succeeded");
    let name = format!("{err:?}");
    assert!(name.starts_with(&kind), "Expected {kind}, got {name}");
}

#[then("the operation succeeds")]
async fn succeeds(world: &mut StoreWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
}

#[then(expr = "the order is {word} with a total of {word}")]
async fn order_status_and_total(world: &mut StoreWorld, status: String, total: String) {
    let id = world.order().id;
    let order = world.sys().db.fetch_order(id).await.unwrap().expect("Order vanished");
    assert_eq!(order.status, OrderStatusType::from_str(&status).expect("Unknown status"));
    assert_eq!(order.total_price, Some(money(&total)));
}

#[then(expr = "the order is {word}")]
async fn order_status(world: &mut StoreWorld, status: String) {
    let id = world.order().id;
    let order = world.sys().db.fetch_order(id).await.unwrap().expect("Order vanished");
    assert_eq!(order.status, OrderStatusType::from_str(&status).expect("Unknown status"));
}

#[then(expr = "{word} owns games {string}")]
async fn owns_games(world: &mut StoreWorld, name: String, games: String) {
    let account_id = world.account(&name);
    let customer = world.sys().db.fetch_customer_for_account(account_id).await.unwrap().expect("No customer");
    let mut owned =
        world.sys().db.list_owned(customer.id).await.unwrap().into_iter().map(|g| g.game_id).collect::<Vec<_>>();
    owned.sort();
    let mut expected = games
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<i64>().expect("Not a game id"))
        .collect::<Vec<_>>();
    expected.sort();
    assert_eq!(owned, expected);
}

#[then(expr = "there are {int} ownership record(s)")]
async fn ownership_count(world: &mut StoreWorld, count: i64) {
    assert_eq!(world.fixture().count("SELECT COUNT(*) FROM ownership").await, count);
}

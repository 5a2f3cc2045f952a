use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    App,
};
use game_store_engine::{
    events::EventProducers,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        FakePaymentProvider,
        StoreFixture,
    },
    SnapConfig,
    SqliteDatabase,
};
use gsp_common::{Money, Secret};
use log::debug;

use crate::{
    auth::{Role, TokenIssuer},
    config::{AuthConfig, ServerConfig},
    server::configure_app,
};

pub const JWT_SECRET: &str = "endpoint-test-jwt-secret";
pub const SERVER_KEY: &str = "SB-Mid-server-endpoint-test";

pub struct TestContext {
    pub db: SqliteDatabase,
    pub config: ServerConfig,
    pub provider: FakePaymentProvider,
    /// Account id of a customer with no orders
    pub alice: i64,
    pub bob: i64,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        auth: AuthConfig::new(JWT_SECRET),
        payment: SnapConfig { server_key: Secret::new(SERVER_KEY.to_string()), ..Default::default() },
        ..Default::default()
    }
}

/// A migrated database with two customers and games 7 (19.99) and 9 (4.99).
pub async fn setup(config: ServerConfig) -> TestContext {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to test database");
    let fixture = StoreFixture::new(&db);
    let (alice, _) = fixture.customer("alice@example.com").await;
    let (bob, _) = fixture.customer("bob@example.com").await;
    fixture.game(7, "Starfall Tactics", Money::from(1999)).await;
    fixture.game(9, "Pocket Dungeon", Money::from(499)).await;
    TestContext { db, config, provider: FakePaymentProvider::default(), alice, bob }
}

pub fn customer_token(config: &ServerConfig, account_id: i64) -> String {
    token_with_roles(config, account_id, vec![Role::Customer])
}

pub fn token_with_roles(config: &ServerConfig, account_id: i64, roles: Vec<Role>) -> String {
    TokenIssuer::new(&config.auth).issue_token(account_id, roles, None).expect("Failed to issue token")
}

pub fn with_token(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {token}")))
}

/// Sends `req` through a fresh app. Errors raised by middleware come back as `Err` from the service rather than as
/// responses, so they are rendered here the way the server would render them.
pub async fn send(ctx: &TestContext, req: TestRequest) -> (StatusCode, String) {
    let config = ctx.config.clone();
    let db = ctx.db.clone();
    let provider = ctx.provider.clone();
    let app = App::new().configure(move |cfg| configure_app(cfg, &config, db, provider, EventProducers::default()));
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => (e.as_response_error().status_code(), e.to_string()),
    }
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON. {e}: {body}"))
}

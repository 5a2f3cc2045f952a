use std::time::Duration;

use actix_web::{dev::Server, guard, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use game_store_engine::{
    events::{EventHandlers, EventProducers},
    AccountApi,
    CartApi,
    OrderFlowApi,
    PaymentApi,
    PaymentProvider,
    ReconciliationApi,
    SnapClient,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    hooks::audit_hooks,
    middleware::{JwtMiddlewareFactory, WebhookGuard},
    routes::{
        health,
        payment_webhook,
        AddToCartRoute,
        CheckoutRoute,
        ClearCartRoute,
        CreatePaymentSessionRoute,
        GetCartRoute,
        MyGamesRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        OrderStatusRoute,
        PaymentNotificationRoute,
        RemoveFromCartRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 64;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let provider =
        SnapClient::new(config.payment.clone()).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, audit_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, provider, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance<P>(
    config: ServerConfig,
    db: SqliteDatabase,
    provider: P,
    producers: EventProducers,
) -> Result<Server, ServerError>
where
    P: PaymentProvider + Clone + Send + 'static,
{
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let config = config.clone();
        let db = db.clone();
        let provider = provider.clone();
        let producers = producers.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gsp::access_log"))
            .configure(move |cfg| configure_app(cfg, &config, db, provider, producers))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    info!("🚀️ Server listening on {host}:{port}");
    Ok(srv)
}

/// Registers the API state and every route. Shared by the server and the endpoint tests.
///
/// Customer routes live under `/api` behind the JWT middleware. The provider callbacks sit outside it, since the
/// provider authenticates with a signature (notifications) or an HMAC header (webhook) instead.
pub fn configure_app<P>(
    cfg: &mut web::ServiceConfig,
    config: &ServerConfig,
    db: SqliteDatabase,
    provider: P,
    producers: EventProducers,
) where
    P: PaymentProvider + 'static,
{
    let cart_api = CartApi::new(db.clone()).with_catalog_timeout(config.catalog_timeout);
    let order_flow_api = OrderFlowApi::new(db.clone());
    let accounts_api = AccountApi::new(db.clone());
    let payment_api = PaymentApi::new(db.clone(), provider);
    let reconciliation_api = ReconciliationApi::new(db, config.payment.server_key.clone(), producers);
    let verifier = TokenVerifier::new(&config.auth);

    cfg.app_data(web::Data::new(cart_api))
        .app_data(web::Data::new(order_flow_api))
        .app_data(web::Data::new(accounts_api))
        .app_data(web::Data::new(payment_api))
        .app_data(web::Data::new(reconciliation_api))
        .app_data(web::Data::new(ServerOptions::from_config(config)));

    let api_scope = web::scope("/api")
        .wrap(JwtMiddlewareFactory::new(verifier))
        .service(GetCartRoute::<SqliteDatabase>::new())
        .service(AddToCartRoute::<SqliteDatabase>::new())
        .service(RemoveFromCartRoute::<SqliteDatabase>::new())
        .service(ClearCartRoute::<SqliteDatabase>::new())
        .service(CheckoutRoute::<SqliteDatabase>::new())
        .service(MyOrdersRoute::<SqliteDatabase>::new())
        .service(OrderByIdRoute::<SqliteDatabase>::new())
        .service(OrderStatusRoute::<SqliteDatabase>::new())
        .service(MyGamesRoute::<SqliteDatabase>::new())
        .service(CreatePaymentSessionRoute::<SqliteDatabase, P>::new());

    cfg.service(health).service(PaymentNotificationRoute::<SqliteDatabase>::new()).service(api_scope);

    if config.webhook.enabled {
        let checks = if config.webhook.hmac_checks { "on" } else { "off" };
        info!("🚀️ Payment webhook enabled. HMAC checks are {checks}");
        let webhook = web::resource("/payments/webhook")
            .name("payment_webhook")
            .guard(guard::Post())
            .to(payment_webhook::<SqliteDatabase>)
            .wrap(WebhookGuard::new(&config.webhook));
        cfg.service(webhook);
    } else {
        debug!("🚀️ Payment webhook is disabled");
    }
}

//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they extract the account id from the token, call
//! one engine API method and shape the response. Anything longer belongs in the engine.
//!
//! Every handler is async. Blocking a worker thread would stall every other request on that worker, and all of the
//! work here is database or network I/O anyway.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use bytes::Bytes;
use game_store_engine::{
    payment_objects::{PaymentNotification, PaymentWebhook},
    traits::{CartManagement, PaymentGatewayDatabase},
    AccountApi,
    CartApi,
    OrderFlowApi,
    PaymentApi,
    PaymentProvider,
    ReconciliationApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, Role},
    config::ServerOptions,
    data_objects::{
        AddToCartRequest,
        CallbackAck,
        ClearedResponse,
        OrderStatusResponse,
        PaymentSessionResponse,
        RemovedResponse,
    },
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Each bound becomes a type parameter of the route struct, named after the bound (`impl CartManagement` gives
// `TCartManagement`), in the order given.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds >],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds >] >,)+ );}
        paste::paste! { impl< $( [< T $bounds >],)+ > [<$name:camel Route>]< $( [< T $bounds >],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds >] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds >],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds >] >,)+ );}
        paste::paste! { impl< $( [< T $bounds >],)+ > [<$name:camel Route>]< $( [< T $bounds >],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds >] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds>],)+>
        where
            $([<T $bounds>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(get_cart => Get "/cart" impl CartManagement where requires [Role::Customer]);
/// Returns the caller's open cart and its running total. A caller without a cart gets an empty one.
pub async fn get_cart<B: CartManagement>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    debug!("💻️ GET cart for account {account_id}");
    let cart = api.get_cart(account_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_to_cart => Post "/cart" impl CartManagement where requires [Role::Customer]);
/// Adds one game to the caller's cart at its current catalog price. The body is `{"game_id": 7}`.
pub async fn add_to_cart<B: CartManagement>(
    claims: JwtClaims,
    body: web::Json<AddToCartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    let game_id = body.into_inner().game_id;
    debug!("💻️ POST cart for account {account_id}: game {game_id}");
    let line = api.add_item(account_id, game_id).await.map_err(|e| {
        debug!("💻️ Could not add game {game_id} to the cart. {e}");
        e
    })?;
    Ok(HttpResponse::Created().json(line))
}

route!(remove_from_cart => Delete "/cart/{game_id}" impl CartManagement where requires [Role::Customer]);
pub async fn remove_from_cart<B: CartManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    let game_id = path.into_inner();
    debug!("💻️ DELETE cart/{game_id} for account {account_id}");
    let removed = api.remove_item(account_id, game_id).await?;
    Ok(HttpResponse::Ok().json(RemovedResponse { removed }))
}

route!(clear_cart => Delete "/cart" impl CartManagement where requires [Role::Customer]);
pub async fn clear_cart<B: CartManagement>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    debug!("💻️ DELETE cart for account {account_id}");
    let cleared = api.clear(account_id).await?;
    Ok(HttpResponse::Ok().json(ClearedResponse { cleared }))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl CartManagement where requires [Role::Customer]);
/// Freezes the caller's cart into an order awaiting payment.
pub async fn checkout<B: CartManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    debug!("💻️ POST checkout for account {account_id}");
    let order = api.checkout(account_id).await.map_err(|e| {
        debug!("💻️ Checkout failed for account {account_id}. {e}");
        e
    })?;
    Ok(HttpResponse::Created().json(OrderStatusResponse::from(&order)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl PaymentGatewayDatabase where requires [Role::Customer]);
/// The caller's checked-out orders, newest first. The open cart is not included.
pub async fn my_orders<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    debug!("💻️ GET orders for account {account_id}");
    let orders = api.orders_for_account(account_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl PaymentGatewayDatabase where requires [Role::Customer]);
/// An order with its lines and latest payment. Other customers' orders are forbidden.
pub async fn order_by_id<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for account {account_id}");
    let details = api.order_details(account_id, order_id).await?;
    Ok(HttpResponse::Ok().json(details))
}

route!(order_status => Get "/orders/{order_id}/status" impl PaymentGatewayDatabase where requires [Role::Customer]);
pub async fn order_status<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    let order_id = path.into_inner();
    trace!("💻️ GET status of order {order_id} for account {account_id}");
    let status = api.order_status(account_id, order_id).await?;
    Ok(HttpResponse::Ok().json(OrderStatusResponse { order_id, status, total_price: None }))
}

route!(my_games => Get "/games" impl PaymentGatewayDatabase where requires [Role::Customer]);
pub async fn my_games<B: PaymentGatewayDatabase>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    debug!("💻️ GET owned games for account {account_id}");
    let games = api.owned_games(account_id).await?;
    Ok(HttpResponse::Ok().json(games))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(create_payment_session => Post "/payments/{order_id}" impl PaymentGatewayDatabase, PaymentProvider where requires [Role::Customer]);
/// Opens a hosted payment session for one of the caller's orders and returns the URL to redirect the customer to.
pub async fn create_payment_session<B: PaymentGatewayDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = claims.account_id()?;
    let order_id = path.into_inner();
    debug!("💻️ POST payment session for order {order_id} by account {account_id}");
    let session = api.create_payment_session(account_id, order_id).await.map_err(|e| {
        warn!("💻️ Could not open a payment session for order {order_id}. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(PaymentSessionResponse::from(session)))
}

//----------------------------------------------   Provider callbacks  ----------------------------------------------
route!(payment_notification => Post "/payments/notification" impl PaymentGatewayDatabase);
/// Signed asynchronous notification from the payment provider.
///
/// The provider retries until it gets a 2xx response, so only failures that might succeed on retry are answered
/// with a 500. Everything else, including bad signatures and unknown orders, is acknowledged with a 200 and an
/// `ignored` status. The outcome is in the body either way.
pub async fn payment_notification<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: Bytes,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse {
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    let raw = String::from_utf8_lossy(&body).to_string();
    info!("💻️ Payment notification from {peer:?}: {raw}");
    let result = match serde_json::from_slice::<PaymentNotification>(&body) {
        Ok(notification) => api.handle_notification(&notification, &raw).await,
        Err(e) => {
            warn!("💻️ Could not deserialize payment notification. {e}. Payload: {raw}");
            return HttpResponse::Ok().json(CallbackAck::ignored(format!("Invalid payload. {e}")));
        },
    };
    acknowledge(result)
}

/// The unsigned webhook variant. Only registered when enabled, and then behind the HMAC middleware, so it is wired up
/// by hand in [`crate::server::configure_app`] rather than through `route!`.
pub async fn payment_webhook<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: Bytes,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse {
    let peer = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    let raw = String::from_utf8_lossy(&body).to_string();
    info!("💻️ Payment webhook from {peer:?}: {raw}");
    let result = match serde_json::from_slice::<PaymentWebhook>(&body) {
        Ok(webhook) => api.handle_webhook(&webhook, &raw).await,
        Err(e) => {
            warn!("💻️ Could not deserialize payment webhook. {e}. Payload: {raw}");
            return HttpResponse::Ok().json(CallbackAck::ignored(format!("Invalid payload. {e}")));
        },
    };
    acknowledge(result)
}

fn acknowledge<R>(result: R) -> HttpResponse
where CallbackAck: From<R> {
    let ack = CallbackAck::from(result);
    if ack.is_retry() {
        warn!("💻️ Asking the provider to retry. {:?}", ack.reason);
        HttpResponse::InternalServerError().json(ack)
    } else {
        trace!("💻️ Callback acknowledged: {ack:?}");
        HttpResponse::Ok().json(ack)
    }
}

use actix_web::{http::StatusCode, test::TestRequest};
use game_store_engine::test_utils::ProviderBehaviour;
use serde_json::json as j;

use super::helpers::{customer_token, json, send, setup, test_config, with_token, TestContext};

/// Alice puts game 7 in her cart and checks out. Returns the order id.
pub async fn checked_out_order(ctx: &TestContext, token: &str) -> i64 {
    let req = with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": 7 })), token);
    let (status, _) = send(ctx, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(ctx, with_token(TestRequest::post().uri("/api/checkout"), token)).await;
    assert_eq!(status, StatusCode::CREATED);
    json(&body)["order_id"].as_i64().expect("order id")
}

#[actix_web::test]
async fn open_payment_session() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let order_id = checked_out_order(&ctx, &token).await;

    let uri = format!("/api/payments/{order_id}");
    let (status, body) = send(&ctx, with_token(TestRequest::post().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let session = json(&body);
    assert_eq!(session["order_id"], order_id);
    let redirect = session["redirect_url"].as_str().expect("redirect url");
    assert!(redirect.starts_with("https://pay.example.com/token-ORDER-"), "{redirect}");

    let (status, _) = send(&ctx, with_token(TestRequest::post().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/orders/{order_id}");
    let (status, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let payment = &json(&body)["payment"];
    assert_eq!(payment["external_ref"], session["external_ref"]);
    assert_eq!(payment["amount"], 1999);
    assert_eq!(payment["status"], "Pending");
}

#[actix_web::test]
async fn session_for_someone_elses_order() {
    let ctx = setup(test_config()).await;
    let alice = customer_token(&ctx.config, ctx.alice);
    let bob = customer_token(&ctx.config, ctx.bob);
    let order_id = checked_out_order(&ctx, &alice).await;
    let uri = format!("/api/payments/{order_id}");
    let (status, _) = send(&ctx, with_token(TestRequest::post().uri(&uri), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/orders/{order_id}");
    let (_, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &alice)).await;
    assert!(json(&body)["payment"].is_null());
}

#[actix_web::test]
async fn session_for_unknown_order() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let (status, _) = send(&ctx, with_token(TestRequest::post().uri("/api/payments/999"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn provider_outage_is_a_bad_gateway() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let order_id = checked_out_order(&ctx, &token).await;
    ctx.provider.set_behaviour(ProviderBehaviour::TimeOut);
    let uri = format!("/api/payments/{order_id}");
    let (status, _) = send(&ctx, with_token(TestRequest::post().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    ctx.provider.set_behaviour(ProviderBehaviour::Succeed);
    let (status, _) = send(&ctx, with_token(TestRequest::post().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::OK);
}

use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json as j;

use super::helpers::{customer_token, json, send, setup, test_config, token_with_roles, with_token};
use crate::auth::Role;

#[actix_web::test]
async fn health_check() {
    let ctx = setup(test_config()).await;
    let (status, body) = send(&ctx, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn cart_requires_a_token() {
    let ctx = setup(test_config()).await;
    let (status, body) = send(&ctx, TestRequest::get().uri("/api/cart")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("token"), "{body}");
}

#[actix_web::test]
async fn cart_rejects_a_token_signed_with_another_secret() {
    let ctx = setup(test_config()).await;
    let mut other = test_config();
    other.auth = crate::config::AuthConfig::new("some-other-secret");
    let token = customer_token(&other, ctx.alice);
    let (status, _) = send(&ctx, with_token(TestRequest::get().uri("/api/cart"), &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn cart_requires_the_customer_role() {
    let ctx = setup(test_config()).await;
    let token = token_with_roles(&ctx.config, ctx.alice, vec![Role::Admin]);
    let (status, _) = send(&ctx, with_token(TestRequest::get().uri("/api/cart"), &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn empty_cart() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let (status, body) = send(&ctx, with_token(TestRequest::get().uri("/api/cart"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let cart = json(&body);
    assert_eq!(cart["order_id"], serde_json::Value::Null);
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["total"], 0);
}

#[actix_web::test]
async fn add_remove_and_clear() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let add = |game_id: i64| {
        with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": game_id })), &token)
    };

    let (status, body) = send(&ctx, add(7)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json(&body)["game_id"], 7);
    let (status, _) = send(&ctx, add(9)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&ctx, add(7)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json(&body)["error"].as_str().is_some());

    let (status, body) = send(&ctx, with_token(TestRequest::get().uri("/api/cart"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["total"], 2498);

    let (status, body) = send(&ctx, with_token(TestRequest::delete().uri("/api/cart/9"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["removed"], true);
    let (_, body) = send(&ctx, with_token(TestRequest::delete().uri("/api/cart/9"), &token)).await;
    assert_eq!(json(&body)["removed"], false);

    let (status, body) = send(&ctx, with_token(TestRequest::delete().uri("/api/cart"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["cleared"], 1);
}

#[actix_web::test]
async fn unknown_game_is_not_found() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let req = with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": 404 })), &token);
    let (status, _) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn checkout_freezes_the_cart() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let req = with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": 7 })), &token);
    send(&ctx, req).await;

    let (status, body) = send(&ctx, with_token(TestRequest::post().uri("/api/checkout"), &token)).await;
    assert_eq!(status, StatusCode::CREATED);
    let order = json(&body);
    assert_eq!(order["status"], "PendingPayment");
    assert_eq!(order["total_price"], 1999);
    let order_id = order["order_id"].as_i64().expect("order id");

    let (status, _) = send(&ctx, with_token(TestRequest::post().uri("/api/checkout"), &token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/api/orders/{order_id}/status");
    let (status, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "PendingPayment");

    let (status, body) = send(&ctx, with_token(TestRequest::get().uri("/api/orders"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn empty_checkout_is_rejected() {
    let ctx = setup(test_config()).await;
    let token = customer_token(&ctx.config, ctx.alice);
    let req = with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": 7 })), &token);
    send(&ctx, req).await;
    send(&ctx, with_token(TestRequest::delete().uri("/api/cart/7"), &token)).await;
    let (status, _) = send(&ctx, with_token(TestRequest::post().uri("/api/checkout"), &token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn other_customers_orders_are_forbidden() {
    let ctx = setup(test_config()).await;
    let alice = customer_token(&ctx.config, ctx.alice);
    let bob = customer_token(&ctx.config, ctx.bob);
    let req = with_token(TestRequest::post().uri("/api/cart").set_json(j!({ "game_id": 7 })), &alice);
    send(&ctx, req).await;
    let (_, body) = send(&ctx, with_token(TestRequest::post().uri("/api/checkout"), &alice)).await;
    let order_id = json(&body)["order_id"].as_i64().expect("order id");

    let uri = format!("/api/orders/{order_id}");
    let (status, _) = send(&ctx, with_token(TestRequest::get().uri(&uri), &bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["lines"].as_array().map(Vec::len), Some(1));
}

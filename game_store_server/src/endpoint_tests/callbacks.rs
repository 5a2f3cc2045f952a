use actix_web::{http::StatusCode, test::TestRequest};
use game_store_engine::test_utils::signed_notification;
use gsp_common::Secret;
use serde_json::json as j;

use super::{
    helpers::{customer_token, json, send, setup, test_config, with_token, TestContext, SERVER_KEY},
    payments::checked_out_order,
};
use crate::{config::WebhookConfig, helpers::calculate_hmac, middleware::WEBHOOK_SIGNATURE_HEADER};

const HMAC_SECRET: &str = "webhook-hmac-secret";

/// Checks out game 7 for Alice and opens a session. Returns the order id and the external reference.
async fn awaiting_payment(ctx: &TestContext) -> (i64, String) {
    let token = customer_token(&ctx.config, ctx.alice);
    let order_id = checked_out_order(ctx, &token).await;
    let uri = format!("/api/payments/{order_id}");
    let (status, body) = send(ctx, with_token(TestRequest::post().uri(&uri), &token)).await;
    assert_eq!(status, StatusCode::OK);
    let external_ref = json(&body)["external_ref"].as_str().expect("external ref").to_string();
    (order_id, external_ref)
}

async fn owned_games(ctx: &TestContext) -> usize {
    let token = customer_token(&ctx.config, ctx.alice);
    let (status, body) = send(ctx, with_token(TestRequest::get().uri("/api/games"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    json(&body).as_array().map(Vec::len).unwrap_or_default()
}

fn notification(payload: &impl serde::Serialize) -> TestRequest {
    TestRequest::post().uri("/payments/notification").set_json(payload)
}

#[actix_web::test]
async fn settlement_pays_the_order() {
    let ctx = setup(test_config()).await;
    let (order_id, external_ref) = awaiting_payment(&ctx).await;
    let payload = signed_notification(&external_ref, "settlement", None, "1999.00", SERVER_KEY);

    let (status, body) = send(&ctx, notification(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
    assert_eq!(owned_games(&ctx).await, 1);

    let token = customer_token(&ctx.config, ctx.alice);
    let uri = format!("/api/orders/{order_id}/status");
    let (_, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &token)).await;
    assert_eq!(json(&body)["status"], "Paid");

    // The provider retries until it sees a 2xx
    let (status, body) = send(&ctx, notification(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    let ack = json(&body);
    assert_eq!(ack["status"], "ignored");
    assert_eq!(ack["reason"], format!("Order {order_id} is already paid"));
    assert_eq!(owned_games(&ctx).await, 1);
}

#[actix_web::test]
async fn bad_signature_is_acknowledged_but_ignored() {
    let ctx = setup(test_config()).await;
    let (_, external_ref) = awaiting_payment(&ctx).await;
    let payload = signed_notification(&external_ref, "settlement", None, "1999.00", "not-the-server-key");
    let (status, body) = send(&ctx, notification(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ignored");
    assert_eq!(owned_games(&ctx).await, 0);
}

#[actix_web::test]
async fn malformed_notification_is_ignored() {
    let ctx = setup(test_config()).await;
    let req = TestRequest::post().uri("/payments/notification").set_payload("this is not json");
    let (status, body) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::OK);
    let ack = json(&body);
    assert_eq!(ack["status"], "ignored");
    assert!(ack["reason"].as_str().unwrap_or_default().starts_with("Invalid payload."));
}

#[actix_web::test]
async fn expiry_fails_the_order() {
    let ctx = setup(test_config()).await;
    let (order_id, external_ref) = awaiting_payment(&ctx).await;
    let payload = signed_notification(&external_ref, "expire", None, "1999.00", SERVER_KEY);
    let (status, body) = send(&ctx, notification(&payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");

    let late = signed_notification(&external_ref, "settlement", None, "1999.00", SERVER_KEY);
    let (status, body) = send(&ctx, notification(&late)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ignored");
    assert_eq!(owned_games(&ctx).await, 0);

    let token = customer_token(&ctx.config, ctx.alice);
    let uri = format!("/api/orders/{order_id}/status");
    let (_, body) = send(&ctx, with_token(TestRequest::get().uri(&uri), &token)).await;
    assert_eq!(json(&body)["status"], "Failed");
}

#[actix_web::test]
async fn webhook_is_disabled_by_default() {
    let ctx = setup(test_config()).await;
    let payload = j!({"order_id": 1, "transaction_status": "settlement"});
    let req = TestRequest::post().uri("/payments/webhook").set_json(payload);
    let (status, _) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn webhook_config() -> crate::config::ServerConfig {
    let mut config = test_config();
    config.webhook =
        WebhookConfig { enabled: true, hmac_secret: Secret::new(HMAC_SECRET.to_string()), hmac_checks: true };
    config
}

#[actix_web::test]
async fn webhook_requires_a_valid_hmac() {
    let ctx = setup(webhook_config()).await;
    let (order_id, _) = awaiting_payment(&ctx).await;
    let body = j!({"order_id": order_id, "transaction_status": "settlement"}).to_string();

    let req = TestRequest::post().uri("/payments/webhook").set_payload(body.clone());
    let (status, _) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, calculate_hmac("wrong-secret", body.as_bytes())))
        .set_payload(body.clone());
    let (status, _) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(owned_games(&ctx).await, 0);

    let req = TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, calculate_hmac(HMAC_SECRET, body.as_bytes())))
        .set_payload(body);
    let (status, body) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
    assert_eq!(owned_games(&ctx).await, 1);
}

#[actix_web::test]
async fn webhook_without_a_secret_denies_everything() {
    let mut config = webhook_config();
    config.webhook.hmac_secret = Secret::default();
    let ctx = setup(config).await;
    let body = j!({"order_id": 1, "transaction_status": "settlement"}).to_string();
    let req = TestRequest::post()
        .uri("/payments/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, calculate_hmac("", body.as_bytes())))
        .set_payload(body);
    let (status, _) = send(&ctx, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn infrastructure_failure_asks_for_retry() {
    let ctx = setup(test_config()).await;
    let (_, external_ref) = awaiting_payment(&ctx).await;
    ctx.db.pool().close().await;

    let payload = signed_notification(&external_ref, "settlement", None, "1999.00", SERVER_KEY);
    let (status, body) = send(&ctx, notification(&payload)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let ack = json(&body);
    assert_eq!(ack["status"], "retry");
    assert!(!ack["reason"].as_str().unwrap_or_default().is_empty(), "{ack}");
}

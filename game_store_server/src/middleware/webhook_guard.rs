//! Signature guard for the payment webhook.
//!
//! Webhook calls carry no provider signature, so the caller signs the raw request body with HMAC-SHA256 using the
//! shared `GSP_WEBHOOK_HMAC_SECRET` and sends the base64 digest in [`WEBHOOK_SIGNATURE_HEADER`]. Once the signature
//! checks out the body is put back on the request for the handler.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use game_store_engine::helpers::constant_time_eq;
use gsp_common::Secret;
use log::{trace, warn};

use crate::{
    config::WebhookConfig,
    errors::{ServerError, WebhookAuthError},
    helpers::calculate_hmac,
};

pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Webhook-Hmac-SHA256";

/// Checks the base64 HMAC-SHA256 `signature` of `body` against `secret`. An empty secret rejects everything.
pub fn check_webhook_signature(
    secret: &Secret<String>,
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), WebhookAuthError> {
    if secret.is_empty() {
        return Err(WebhookAuthError::NoSecret);
    }
    let signature = signature.map(str::trim).filter(|s| !s.is_empty()).ok_or(WebhookAuthError::MissingSignature)?;
    let expected = calculate_hmac(secret.reveal(), body);
    if constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        Err(WebhookAuthError::BadSignature)
    }
}

/// Wraps the webhook resource. With `hmac_checks` off every call is let through.
pub struct WebhookGuard {
    secret: Option<Secret<String>>,
}

impl WebhookGuard {
    pub fn new(config: &WebhookConfig) -> Self {
        Self { secret: config.hmac_checks.then(|| config.hmac_secret.clone()) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for WebhookGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = WebhookGuardService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WebhookGuardService { secret: self.secret.clone(), service: Rc::new(service) }))
    }
}

pub struct WebhookGuardService<S> {
    secret: Option<Secret<String>>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for WebhookGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let Some(secret) = self.secret.clone() else {
            trace!("🔐️ Webhook signature checks are off");
            return Box::pin(self.service.call(req));
        };
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let body = req
                .extract::<web::Bytes>()
                .await
                .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            let signature = req.headers().get(WEBHOOK_SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
            if let Err(e) = check_webhook_signature(&secret, signature, &body) {
                warn!("🔐️ Webhook call from {:?} refused. {e}", req.peer_addr());
                return Err(ServerError::from(e).into());
            }
            trace!("🔐️ Webhook signature ✅️");
            req.set_payload(restore_body(body));
            service.call(req).await
        })
    }
}

fn restore_body(body: web::Bytes) -> Payload {
    let (_, mut payload) = h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}

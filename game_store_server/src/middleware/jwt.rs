//! Bearer token middleware.
//!
//! Reads `Authorization: Bearer <token>`, verifies it with the configured [`TokenVerifier`] and stores the
//! [`JwtClaims`] in the request extensions, where handlers and the ACL middleware pick them up. Requests without a
//! valid token never reach the wrapped service.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::{JwtClaims, TokenVerifier},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    verifier: TokenVerifier,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { verifier: Rc::new(self.verifier.clone()), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: Rc<TokenVerifier>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Rc::clone(&self.verifier);
        Box::pin(async move {
            let claims = bearer_claims(&req, &verifier).map_err(|e| {
                debug!("🔐️ Rejected request to {}. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            req.extensions_mut().insert::<JwtClaims>(claims);
            service.call(req).await
        })
    }
}

fn bearer_claims(req: &ServiceRequest, verifier: &TokenVerifier) -> Result<JwtClaims, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a bearer token".to_string()))?;
    verifier.verify(token.trim())
}

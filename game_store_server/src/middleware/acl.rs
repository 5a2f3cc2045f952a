//! Access control list middleware.
//!
//! Checks the roles in the request's [`JwtClaims`] against the roles a route requires. The claims are put there by the
//! JWT middleware, so this must sit inside it. A caller missing any required role gets a 403 Forbidden response.
use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{JwtClaims, Role},
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let roles = req
                .extensions()
                .get::<JwtClaims>()
                .map(|c| c.roles.clone())
                .ok_or_else(|| {
                    warn!("🔐️ No JWT claims found in request extensions");
                    ServerError::AuthenticationError(AuthError::MissingToken)
                })?;
            if required_roles.iter().all(|role| roles.contains(role)) {
                service.call(req).await
            } else {
                let required = required_roles.iter().map(Role::to_string).collect::<Vec<_>>().join(", ");
                debug!("🔐️ Access to {} denied. Requires [{required}]", req.path());
                Err(ServerError::AuthenticationError(AuthError::InsufficientPermissions(required)).into())
            }
        })
    }
}

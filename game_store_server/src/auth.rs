use std::{
    fmt::Display,
    future::{ready, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{
    decode,
    encode,
    errors::ErrorKind as JwtErrorKind,
    Algorithm,
    DecodingKey,
    EncodingKey,
    Header,
    Validation,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

/// The claims of a bearer token. `sub` is the account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub exp: i64,
}

impl JwtClaims {
    pub fn account_id(&self) -> Result<i64, AuthError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AuthError::PoorlyFormattedToken(format!("'{}' is not an account id", self.sub)))
    }
}

/// Verified claims are placed in the request extensions by [`crate::middleware::JwtMiddlewareFactory`]. Handlers
/// take them as an argument.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
            warn!("🔐️ No JWT claims found in request extensions");
            ServerError::AuthenticationError(AuthError::MissingToken)
        });
        ready(claims)
    }
}

/// Checks HS256 bearer tokens against the configured secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, validation: Validation::new(Algorithm::HS256) }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) | JwtErrorKind::Json(_) | JwtErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        data.claims.account_id()?;
        trace!("🔐️ Access token validated for account {}", data.claims.sub);
        Ok(data.claims)
    }
}

/// Issues access tokens. In production tokens come from the identity provider; this is used by tooling and tests
/// that share the secret.
pub struct TokenIssuer {
    key: EncodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { key, lifetime: config.token_lifetime }
    }

    pub fn issue_token(
        &self,
        account_id: i64,
        roles: Vec<Role>,
        lifetime: Option<Duration>,
    ) -> Result<String, AuthError> {
        let lifetime = lifetime.unwrap_or(self.lifetime);
        let exp = Utc::now().timestamp() + i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX / 2);
        let claims = JwtClaims { sub: account_id.to_string(), roles, exp };
        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }
}

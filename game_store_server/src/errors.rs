use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use game_store_engine::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Webhook call refused. {0}")]
    WebhookRejected(#[from] WebhookAuthError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::WebhookRejected(_) => StatusCode::FORBIDDEN,
            Self::StoreError(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::ExternalFailure => StatusCode::BAD_GATEWAY,
                ErrorKind::IntegrityFailure => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookAuthError {
    #[error("No webhook HMAC secret is configured")]
    NoSecret,
    #[error("No webhook signature was provided")]
    MissingSignature,
    #[error("The webhook signature does not match the request body")]
    BadSignature,
}

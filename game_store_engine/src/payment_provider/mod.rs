//! # Payment providers
//!
//! A [`PaymentProvider`] opens a hosted payment session for a finalized order. The customer is redirected to the
//! provider, and the outcome arrives later as an asynchronous notification (see
//! [`ReconciliationApi`](crate::ReconciliationApi)).
//!
//! [`SnapClient`] is the HTTP implementation used in production.
mod snap_client;

use gsp_common::Money;
use serde::{Deserialize, Serialize};
pub use snap_client::{SnapClient, SnapConfig, DEFAULT_SNAP_URL};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// The external reference the provider will echo back in its notifications
    pub external_ref: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
    /// The provider's response body, stored with the pending payment
    pub raw_response: String,
}

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("Could not initialize the payment provider client: {0}")]
    Initialization(String),
    #[error("The payment provider did not respond in time")]
    Timeout,
    #[error("Could not reach the payment provider: {0}")]
    Transport(String),
    #[error("The payment provider rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment provider sent an invalid response: {0}")]
    InvalidResponse(String),
}

impl PaymentProviderError {
    pub fn is_transient(&self) -> bool {
        match self {
            PaymentProviderError::Timeout | PaymentProviderError::Transport(_) => true,
            PaymentProviderError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Short provider name, recorded on each payment row
    fn name(&self) -> &'static str;

    /// Opens a hosted payment session for `request.amount`. Implementations must bound the call with a timeout and
    /// report it as [`PaymentProviderError::Timeout`].
    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentProviderError>;
}

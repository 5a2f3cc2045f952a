use std::sync::{Arc, Mutex};

use crate::payment_provider::{PaymentProvider, PaymentProviderError, PaymentSession, SessionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBehaviour {
    Succeed,
    TimeOut,
    Reject,
}

/// A cloneable in-memory [`PaymentProvider`] for fixtures that share one provider across many requests. Use
/// [`MockPaymentProvider`](super::MockPaymentProvider) when a test needs to check what the provider was asked.
#[derive(Clone)]
pub struct FakePaymentProvider {
    behaviour: Arc<Mutex<ProviderBehaviour>>,
}

impl Default for FakePaymentProvider {
    fn default() -> Self {
        Self::new(ProviderBehaviour::Succeed)
    }
}

impl FakePaymentProvider {
    pub fn new(behaviour: ProviderBehaviour) -> Self {
        Self { behaviour: Arc::new(Mutex::new(behaviour)) }
    }

    pub fn set_behaviour(&self, behaviour: ProviderBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    fn behaviour(&self) -> ProviderBehaviour {
        *self.behaviour.lock().unwrap()
    }
}

impl PaymentProvider for FakePaymentProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentProviderError> {
        match self.behaviour() {
            ProviderBehaviour::Succeed => {
                let token = format!("token-{}", request.external_ref);
                Ok(PaymentSession {
                    redirect_url: format!("https://pay.example.com/{token}"),
                    raw_response: format!(r#"{{"token":"{token}"}}"#),
                    token,
                })
            },
            ProviderBehaviour::TimeOut => Err(PaymentProviderError::Timeout),
            ProviderBehaviour::Reject => {
                Err(PaymentProviderError::Rejected { status: 400, message: "gross_amount is invalid".into() })
            },
        }
    }
}

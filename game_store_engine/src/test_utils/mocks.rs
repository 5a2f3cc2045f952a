use mockall::mock;

use crate::payment_provider::{PaymentProvider, PaymentProviderError, PaymentSession, SessionRequest};

mock! {
    pub PaymentProvider {}
    impl PaymentProvider for PaymentProvider {
        fn name(&self) -> &'static str;
        async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentProviderError>;
    }
}

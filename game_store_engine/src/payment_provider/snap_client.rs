use std::{sync::Arc, time::Duration};

use gsp_common::Secret;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{PaymentProvider, PaymentProviderError, PaymentSession, SessionRequest};

pub const DEFAULT_SNAP_URL: &str = "https://app.sandbox.midtrans.com/snap/v1/transactions";

#[derive(Debug, Clone)]
pub struct SnapConfig {
    pub api_url: String,
    pub server_key: Secret<String>,
    pub timeout: Duration,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_SNAP_URL.to_string(), server_key: Secret::default(), timeout: Duration::from_secs(10) }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct SnapResponse {
    token: String,
    redirect_url: String,
}

/// Client for a Snap-style hosted checkout API. The server key authenticates as the HTTP basic-auth username.
#[derive(Clone)]
pub struct SnapClient {
    config: SnapConfig,
    client: Arc<Client>,
}

impl SnapClient {
    pub fn new(config: SnapConfig) -> Result<Self, PaymentProviderError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentProviderError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }
}

impl PaymentProvider for SnapClient {
    fn name(&self) -> &'static str {
        "snap"
    }

    async fn create_session(&self, request: &SessionRequest) -> Result<PaymentSession, PaymentProviderError> {
        let body = json!({
            "transaction_details": {
                "order_id": request.external_ref,
                "gross_amount": request.amount.value(),
            }
        });
        trace!("💳️ Requesting payment session for {}", request.external_ref);
        let response = self
            .client
            .post(&self.config.api_url)
            .basic_auth(self.config.server_key.reveal(), Some(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PaymentProviderError::Timeout
                } else {
                    PaymentProviderError::Transport(e.to_string())
                }
            })?;
        let status = response.status();
        let raw_response = response.text().await.map_err(|e| {
            if e.is_timeout() {
                PaymentProviderError::Timeout
            } else {
                PaymentProviderError::Transport(e.to_string())
            }
        })?;
        if !status.is_success() {
            warn!("💳️ Payment provider rejected session for {}. {status}: {raw_response}", request.external_ref);
            return Err(PaymentProviderError::Rejected { status: status.as_u16(), message: raw_response });
        }
        let session: SnapResponse =
            serde_json::from_str(&raw_response).map_err(|e| PaymentProviderError::InvalidResponse(e.to_string()))?;
        debug!("💳️ Payment session opened for {}", request.external_ref);
        Ok(PaymentSession { token: session.token, redirect_url: session.redirect_url, raw_response })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use gsp_common::{Money, Secret};
    use serde_json::{json, Value};
    use wiremock::{
        matchers::{header_exists, method, path},
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;

    const SNAP_PATH: &str = "/snap/v1/transactions";

    fn client(server: &MockServer, timeout: Duration) -> SnapClient {
        SnapClient::new(SnapConfig {
            api_url: format!("{}{SNAP_PATH}", server.uri()),
            server_key: Secret::new("SB-server-key".to_string()),
            timeout,
        })
        .unwrap()
    }

    fn request() -> SessionRequest {
        SessionRequest { external_ref: "ORDER-5-0123456789abcdef0123456789abcdef".into(), amount: Money::from(2498) }
    }

    fn snap_endpoint() -> wiremock::MockBuilder {
        Mock::given(method("POST")).and(path(SNAP_PATH)).and(header_exists("authorization"))
    }

    #[tokio::test]
    async fn creates_session() {
        let server = MockServer::start().await;
        snap_endpoint()
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"token": "abc123", "redirect_url": "https://pay.example.com/abc123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server, Duration::from_secs(5)).create_session(&request()).await.unwrap();
        assert_eq!(session.token, "abc123");
        assert_eq!(session.redirect_url, "https://pay.example.com/abc123");
        assert!(session.raw_response.contains("abc123"));

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let auth = received[0].headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("Basic "), "{auth}");
        let body: Value = received[0].body_json().unwrap();
        assert_eq!(body["transaction_details"]["order_id"], "ORDER-5-0123456789abcdef0123456789abcdef");
        assert_eq!(body["transaction_details"]["gross_amount"], 2498);
    }

    #[tokio::test]
    async fn rejection_is_surfaced() {
        let server = MockServer::start().await;
        snap_endpoint()
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error_messages": ["Access denied"]})))
            .mount(&server)
            .await;
        let err = client(&server, Duration::from_secs(5)).create_session(&request()).await.unwrap_err();
        match err {
            PaymentProviderError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("Access denied"));
            },
            other => panic!("Expected a rejection, got {other}"),
        }
    }

    #[tokio::test]
    async fn garbage_response() {
        let server = MockServer::start().await;
        snap_endpoint()
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;
        let err = client(&server, Duration::from_secs(5)).create_session(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentProviderError::InvalidResponse(_)), "{err}");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        snap_endpoint()
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"token": "late", "redirect_url": "https://pay.example.com/late"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let err = client(&server, Duration::from_millis(200)).create_session(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentProviderError::Timeout), "{err}");
        assert!(err.is_transient());
    }
}

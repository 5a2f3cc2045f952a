use game_store_engine::{
    db_types::{Money, Order, OrderStatusType},
    payment_objects::{PaymentSessionResult, ReconcileOutcome},
    StoreError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub game_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearedResponse {
    pub cleared: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    pub order_id: i64,
    pub status: OrderStatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Money>,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        Self { order_id: order.id, status: order.status, total_price: order.total_price }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    pub order_id: i64,
    pub token: String,
    pub redirect_url: String,
}

impl From<PaymentSessionResult> for PaymentSessionResponse {
    fn from(session: PaymentSessionResult) -> Self {
        Self { order_id: session.order_id, token: session.token, redirect_url: session.redirect_url }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
    Ignored,
    Retry,
}

/// The body returned to the payment provider for a callback. `Retry` is sent with a 500 status so that the provider
/// re-delivers; the others are sent with 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CallbackAck {
    pub fn ok() -> Self {
        Self { status: AckStatus::Ok, reason: None }
    }

    pub fn ignored<S: Into<String>>(reason: S) -> Self {
        Self { status: AckStatus::Ignored, reason: Some(reason.into()) }
    }

    pub fn retry<S: Into<String>>(reason: S) -> Self {
        Self { status: AckStatus::Retry, reason: Some(reason.into()) }
    }

    pub fn is_retry(&self) -> bool {
        self.status == AckStatus::Retry
    }
}

impl From<Result<ReconcileOutcome, StoreError>> for CallbackAck {
    fn from(result: Result<ReconcileOutcome, StoreError>) -> Self {
        match result {
            Ok(ReconcileOutcome::Paid(_)) | Ok(ReconcileOutcome::Failed(_)) => Self::ok(),
            Ok(ReconcileOutcome::AlreadyPaid(o)) => Self::ignored(format!("Order {} is already paid", o.id)),
            Ok(ReconcileOutcome::Unchanged(o)) => Self::ignored(format!("Order {} is {}", o.id, o.status)),
            Ok(ReconcileOutcome::Ignored { transaction_status, .. }) => {
                Self::ignored(format!("No action for status '{transaction_status}'"))
            },
            Err(e) if e.is_transient() => Self::retry(e.to_string()),
            Err(e) => Self::ignored(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ack_bodies() {
        assert_eq!(serde_json::to_string(&CallbackAck::ok()).unwrap(), r#"{"status":"ok"}"#);
        let ack = CallbackAck::from(Err::<ReconcileOutcome, _>(StoreError::InvalidSignature));
        assert_eq!(
            serde_json::to_string(&ack).unwrap(),
            r#"{"status":"ignored","reason":"The notification signature is invalid"}"#
        );
        let ack = CallbackAck::from(Err::<ReconcileOutcome, _>(StoreError::database_unavailable("locked")));
        assert!(ack.is_retry());
        let ack = CallbackAck::from(Err::<ReconcileOutcome, _>(StoreError::database("no such table: orders")));
        assert_eq!(ack.status, AckStatus::Ignored);
        let outcome = ReconcileOutcome::Ignored { order_id: 1, transaction_status: "pending".into() };
        let ack = CallbackAck::from(Ok::<_, StoreError>(outcome));
        assert_eq!(ack.status, AckStatus::Ignored);
    }
}

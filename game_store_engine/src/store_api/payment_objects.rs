use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// A signed asynchronous notification from the payment provider. `order_id` is the external reference
/// (`ORDER-{id}-{random}`) that was sent when the session was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

/// The unsigned webhook variant. `order_id` is the internal order id, sent either as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWebhook {
    pub order_id: WebhookOrderRef,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebhookOrderRef {
    Number(i64),
    Text(String),
}

impl Display for WebhookOrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookOrderRef::Number(n) => write!(f, "{n}"),
            WebhookOrderRef::Text(s) => write!(f, "{s}"),
        }
    }
}

impl WebhookOrderRef {
    /// The internal order id, if the reference is a positive integer.
    pub fn order_id(&self) -> Option<i64> {
        match self {
            WebhookOrderRef::Number(n) => Some(*n),
            WebhookOrderRef::Text(s) => s.trim().parse::<i64>().ok(),
        }
        .filter(|id| *id > 0)
    }
}

/// What a provider transaction status means for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Mark the order paid and grant ownership
    Finalize,
    /// Mark the order failed
    MarkFailed,
    /// Nothing to do (yet). E.g. `pending`, or a card capture still under fraud review.
    NoAction,
}

impl ReconcileAction {
    pub fn for_status(transaction_status: &str, fraud_status: Option<&str>) -> Self {
        let fraud = fraud_status.map(|s| s.trim().to_ascii_lowercase());
        match transaction_status.trim().to_ascii_lowercase().as_str() {
            "settlement" => Self::Finalize,
            "capture" if fraud.as_deref() == Some("accept") => Self::Finalize,
            "expire" | "cancel" | "deny" => Self::MarkFailed,
            _ => Self::NoAction,
        }
    }
}

/// A provider outcome in channel-neutral form.
#[derive(Debug, Clone)]
pub struct ProviderUpdate {
    pub order_id: i64,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub provider_ref: Option<String>,
    pub payment_type: Option<String>,
    /// The amount the provider says was charged, as sent. Only parsed when the update would pay the order.
    pub gross_amount: Option<String>,
    pub raw_payload: String,
}

/// The business outcome of a provider callback. Every variant is a successful acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order moved to `Paid` and ownership was granted
    Paid(Order),
    /// A repeated success for an order that is already `Paid`
    AlreadyPaid(Order),
    /// The order moved to `Failed`
    Failed(Order),
    /// A failure signal for an order that can no longer fail (already `Paid` or `Failed`, or still a cart)
    Unchanged(Order),
    /// The status carries no transition, e.g. `pending`
    Ignored { order_id: i64, transaction_status: String },
}

impl ReconcileOutcome {
    pub fn order_id(&self) -> i64 {
        match self {
            ReconcileOutcome::Paid(o)
            | ReconcileOutcome::AlreadyPaid(o)
            | ReconcileOutcome::Failed(o)
            | ReconcileOutcome::Unchanged(o) => o.id,
            ReconcileOutcome::Ignored { order_id, .. } => *order_id,
        }
    }

    /// Whether this callback changed any state
    pub fn is_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Paid(_) | ReconcileOutcome::Failed(_))
    }
}

/// Returned to the customer after a payment session has been opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSessionResult {
    pub order_id: i64,
    pub external_ref: String,
    pub token: String,
    pub redirect_url: String,
}

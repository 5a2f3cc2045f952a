use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use gsp_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is the customer's open cart. Lines can still be added and removed.
    Cart,
    /// The cart has been checked out. Its total is frozen and it is waiting for the payment provider.
    PendingPayment,
    /// Payment has settled and ownership has been granted. Terminal.
    Paid,
    /// The payment expired, was cancelled or was denied. Terminal.
    Failed,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Cart => write!(f, "Cart"),
            OrderStatusType::PendingPayment => write!(f, "PendingPayment"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cart" => Ok(Self::Cart),
            "PendingPayment" => Ok(Self::PendingPayment),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Failed");
            OrderStatusType::Failed
        })
    }
}

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
/// An order row. While `status` is `Cart` the order is the customer's shopping cart and `total_price` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatusType,
    pub total_price: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

//--------------------------------------      OrderLine        ---------------------------------------------------------
/// A line on an order, with the game title joined in from the catalog. `unit_price` is the price when the game was
/// added to the cart and does not follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub game_id: i64,
    pub title: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// The line total, or `None` if it does not fit in [`Money`]
    pub fn checked_line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

//--------------------------------------         Cart          ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// `None` when the customer has no open cart yet
    pub order_id: Option<i64>,
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

impl Cart {
    pub fn new(order_id: i64, lines: Vec<OrderLine>) -> Self {
        let total = lines.iter().map(OrderLine::line_total).sum();
        Self { order_id: Some(order_id), lines, total }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

//--------------------------------------       Customer        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub account_id: i64,
    pub display_name: Option<String>,
    pub banned: bool,
}

//--------------------------------------       GameInfo        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: i64,
    pub title: String,
    pub price: Money,
}

//--------------------------------------       OwnedGame       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OwnedGame {
    pub game_id: i64,
    pub title: String,
    pub order_id: Option<i64>,
    pub granted_at: DateTime<Utc>,
}

//--------------------------------------        Payment        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: Money,
    pub status: PaymentStatus,
    pub provider: String,
    pub external_ref: String,
    pub provider_ref: Option<String>,
    pub payment_type: Option<String>,
    /// Raw provider request/notification body, kept for audit
    pub provider_payload: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

//--------------------------------------       NewPayment      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub amount: Money,
    pub provider: String,
    pub external_ref: String,
    pub provider_payload: Option<String>,
}

impl NewPayment {
    pub fn new(order_id: i64, amount: Money, provider: impl Into<String>, external_ref: impl Into<String>) -> Self {
        Self { order_id, amount, provider: provider.into(), external_ref: external_ref.into(), provider_payload: None }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.provider_payload = Some(payload.into());
        self
    }
}

//--------------------------------------  PaymentConfirmation  ---------------------------------------------------------
/// The provider's details of a settled (or failed) transaction, written onto the pending payment row.
#[derive(Debug, Clone, Default)]
pub struct PaymentConfirmation {
    pub provider_ref: Option<String>,
    pub payment_type: Option<String>,
    pub payload: String,
}

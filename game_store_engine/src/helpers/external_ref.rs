use std::{fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;

use crate::StoreError;

const PREFIX: &str = "ORDER";

/// The reference sent to the payment provider in place of the bare order id: `ORDER-{id}-{random}`. The random
/// suffix keeps references unique across repeated payment attempts for the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    order_id: i64,
    nonce: String,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^ORDER-([1-9][0-9]*)-([0-9A-Za-z][0-9A-Za-z-]*)$").expect("static regex"))
}

impl ExternalRef {
    /// A fresh reference for `order_id` with 128 random bits as the suffix
    pub fn new(order_id: i64) -> Self {
        let nonce = format!("{:032x}", rand::random::<u128>());
        Self { order_id, nonce }
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }
}

impl Display for ExternalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PREFIX}-{}-{}", self.order_id, self.nonce)
    }
}

impl FromStr for ExternalRef {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidOrderReference(s.to_string());
        let caps = pattern().captures(s.trim()).ok_or_else(invalid)?;
        let order_id = caps[1].parse::<i64>().map_err(|_| invalid())?;
        Ok(Self { order_id, nonce: caps[2].to_string() })
    }
}

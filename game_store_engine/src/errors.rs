use std::fmt::Display;

use gsp_common::Money;
use thiserror::Error;

use crate::{db_types::OrderStatusType, payment_provider::PaymentProviderError};

/// Broad classification of a [`StoreError`]. Transport layers map these onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Forbidden,
    ExternalFailure,
    IntegrityFailure,
    Infrastructure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::ExternalFailure => "external failure",
            ErrorKind::IntegrityFailure => "integrity failure",
            ErrorKind::Infrastructure => "infrastructure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {message}")]
    DatabaseError { message: String, transient: bool },
    #[error("No customer is linked to account {0}")]
    CustomerNotFound(i64),
    #[error("Game {0} does not exist or is no longer for sale")]
    GameNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Order {0} has no pending payment")]
    PaymentNotFound(i64),
    #[error("The customer already owns game {0}")]
    AlreadyOwned(i64),
    #[error("Game {0} is already in the cart")]
    DuplicateInCart(i64),
    #[error("There is no open cart")]
    NoOpenCart,
    #[error("The cart is empty")]
    EmptyCart,
    #[error("A payment session is already pending for order {0}")]
    PaymentAlreadyExists(i64),
    #[error("Order {order_id} cannot be paid while it is {status}")]
    OrderNotPayable { order_id: i64, status: OrderStatusType },
    #[error("Invalid order reference: {0}")]
    InvalidOrderReference(String),
    #[error("Invalid payment notification: {0}")]
    InvalidPayload(String),
    #[error("The account is banned")]
    AccountBanned,
    #[error("Order {0} does not belong to this customer")]
    Forbidden(i64),
    #[error("Payment provider error. {0}")]
    ProviderError(#[from] PaymentProviderError),
    #[error("{0} timed out")]
    Timeout(String),
    #[error("The notification signature is invalid")]
    InvalidSignature,
    #[error("The total of order {0} is too large to be charged")]
    TotalOutOfRange(i64),
    #[error("The notified amount {notified} does not match the order total {expected}")]
    AmountMismatch { expected: Money, notified: Money },
}

impl StoreError {
    /// A database failure that will not go away on retry: bad queries, schema drift, broken invariants
    pub fn database<S: Into<String>>(message: S) -> Self {
        StoreError::DatabaseError { message: message.into(), transient: false }
    }

    /// A database failure caused by contention or an unavailable connection
    pub fn database_unavailable<S: Into<String>>(message: S) -> Self {
        StoreError::DatabaseError { message: message.into(), transient: true }
    }

    pub fn kind(&self) -> ErrorKind {
        use StoreError::*;
        match self {
            DatabaseError { .. } => ErrorKind::Infrastructure,
            CustomerNotFound(_) | GameNotFound(_) | OrderNotFound(_) | PaymentNotFound(_) => ErrorKind::NotFound,
            AlreadyOwned(_) | DuplicateInCart(_) | NoOpenCart | EmptyCart | PaymentAlreadyExists(_) => {
                ErrorKind::Conflict
            },
            OrderNotPayable { .. } | TotalOutOfRange(_) => ErrorKind::Conflict,
            InvalidOrderReference(_) | InvalidPayload(_) => ErrorKind::InvalidInput,
            AccountBanned | Forbidden(_) => ErrorKind::Forbidden,
            ProviderError(_) | Timeout(_) => ErrorKind::ExternalFailure,
            InvalidSignature | AmountMismatch { .. } => ErrorKind::IntegrityFailure,
        }
    }

    /// True for failures that may succeed if the same request is simply tried again later. Payment callbacks that
    /// fail this way are acknowledged as retryable so the provider re-delivers them.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::DatabaseError { transient, .. } => *transient,
            StoreError::Timeout(_) => true,
            StoreError::ProviderError(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes
fn is_contention_code(code: &str) -> bool {
    code.parse::<i32>().map(|c| matches!(c & 0xff, 5 | 6)).unwrap_or(false)
}

fn is_transient_sqlx_error(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db) => {
            db.code().map(|c| is_contention_code(&c)).unwrap_or(false) || {
                let msg = db.message().to_ascii_lowercase();
                msg.contains("database is locked") || msg.contains("database table is locked") || msg.contains("busy")
            }
        },
        _ => false,
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError { transient: is_transient_sqlx_error(&e), message: e.to_string() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(StoreError::EmptyCart.kind(), ErrorKind::Conflict);
        assert_eq!(StoreError::GameNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(StoreError::InvalidSignature.kind(), ErrorKind::IntegrityFailure);
        assert_eq!(StoreError::AccountBanned.kind(), ErrorKind::Forbidden);
        assert_eq!(StoreError::InvalidOrderReference("x".into()).kind(), ErrorKind::InvalidInput);
        let e = StoreError::from(PaymentProviderError::Timeout);
        assert_eq!(e.kind(), ErrorKind::ExternalFailure);
        assert!(e.is_transient());
        let rejected = PaymentProviderError::Rejected { status: 401, message: "unauthorized".into() };
        assert!(!StoreError::from(rejected).is_transient());
        assert!(StoreError::database_unavailable("locked").is_transient());
        assert!(!StoreError::database("no such column: foo").is_transient());
        assert_eq!(StoreError::database("no such column: foo").kind(), ErrorKind::Infrastructure);
        assert!(!StoreError::OrderNotPayable { order_id: 1, status: OrderStatusType::Failed }.is_transient());
    }

    #[test]
    fn only_contention_and_connectivity_are_transient() {
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_transient());
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_transient());
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(StoreError::from(sqlx::Error::Io(reset)).is_transient());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_transient());
        assert!(!StoreError::from(sqlx::Error::ColumnNotFound("total_price".into())).is_transient());
        assert!(!StoreError::from(sqlx::Error::Protocol("bad frame".into())).is_transient());
    }

    #[test]
    fn sqlite_contention_codes() {
        assert!(is_contention_code("5"));
        assert!(is_contention_code("6"));
        // SQLITE_BUSY_SNAPSHOT and SQLITE_LOCKED_SHAREDCACHE
        assert!(is_contention_code("517"));
        assert!(is_contention_code("262"));
        // SQLITE_CONSTRAINT_UNIQUE
        assert!(!is_contention_code("2067"));
        assert!(!is_contention_code("19"));
        assert!(!is_contention_code("HY000"));
    }
}

mod helpers;
mod money;
mod secret;

pub mod op;

pub use helpers::parse_boolean_flag;
pub use money::{Money, MoneyConversionError, MINOR_UNITS_PER_MAJOR};
pub use secret::Secret;

//! Input validation for addresses and amounts.
//!
//! Everything here is pure and synchronous. Raw form input is borrowed, never
//! modified, and either normalized or rejected before it can reach the network.

pub mod address;
pub mod amount;

pub use address::{split_address_list, validate_address, validate_address_list, DEFAULT_SEPARATOR};
pub use amount::{format_base_units, validate_amount, Amount, AmountBounds};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: AddressReason },

    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: AmountReason },
}

/// Why an address was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressReason {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("expected 40 hex digits")]
    WrongLength,
    #[error("non-hex character")]
    NotHex,
    #[error("mixed-case address with a bad checksum")]
    BadChecksum,
}

/// Why an amount was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountReason {
    #[error("empty")]
    Empty,
    #[error("not a plain non-negative decimal number")]
    Malformed,
    #[error("more than {max} fractional digits")]
    TooManyDecimals { max: u8 },
    #[error("too large")]
    Overflow,
    #[error("below the minimum of {min}")]
    BelowMin { min: String },
    #[error("above the maximum of {max}")]
    AboveMax { max: String },
}

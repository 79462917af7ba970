//! Typed write actions and the dispatcher that submits them.
//!
//! Each action is a parameter struct built from raw form input by its `parse`
//! constructor, which runs the input through the `validation` crate and applies
//! the action's unit scaling from [`config::UnitConvention`]:
//!
//! - `supply`: [`Mint`], [`Burn`], [`Airdrop`]
//! - `allowance`: [`Approve`]
//! - `access`: [`SetWhitelist`], [`SetAdmin`]
//! - `params`: [`SetTax`], [`SetTaxReceiver`], [`SetRate`]
//! - `swap`: [`GetToken`], [`GetEth`]
//!
//! [`Dispatcher`] submits them one at a time per kind.

pub mod access;
pub mod allowance;
pub mod dispatcher;
pub mod params;
pub mod supply;
pub mod swap;

pub use access::{SetAdmin, SetWhitelist};
pub use allowance::Approve;
pub use client::ActionKind;
pub use dispatcher::{Dispatcher, Outcome, PendingTransaction};
pub use params::{SetRate, SetTax, SetTaxReceiver};
pub use supply::{Airdrop, Burn, Mint};
pub use swap::{GetEth, GetToken};

use alloy_primitives::{Address, U256};
use client::WriteCall;
use thiserror::Error;
use validation::{validate_amount, Amount, AmountBounds, ValidationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid {kind} parameters: {reason}")]
    InvalidParameters { kind: ActionKind, reason: String },

    #[error("A {0} transaction is already in flight")]
    Busy(ActionKind),
}

/// A state-mutating contract call with typed parameters.
pub trait Action: Send + Sync {
    const KIND: ActionKind;

    /// Check the parameters before anything is sent.
    fn validate(&self) -> Result<(), DispatchError>;

    /// The call as submitted, amounts in base units.
    fn into_call(self) -> WriteCall;

    /// Get a human-readable description of this action.
    fn description(&self) -> String;
}

pub(crate) fn invalid(kind: ActionKind, reason: impl Into<String>) -> DispatchError {
    DispatchError::InvalidParameters {
        kind,
        reason: reason.into(),
    }
}

pub(crate) fn ensure_nonzero_address(
    kind: ActionKind,
    what: &str,
    address: Address,
) -> Result<(), DispatchError> {
    if address == Address::ZERO {
        return Err(invalid(kind, format!("{what} is the zero address")));
    }
    Ok(())
}

pub(crate) fn ensure_positive(
    kind: ActionKind,
    what: &str,
    amount: &Amount,
) -> Result<(), DispatchError> {
    if amount.is_zero() {
        return Err(invalid(kind, format!("{what} is zero")));
    }
    Ok(())
}

/// Parse a strictly positive amount with `decimals` fractional digits.
pub(crate) fn positive_amount(input: &str, decimals: u8) -> Result<Amount, DispatchError> {
    let bounds = AmountBounds::new(decimals).with_min(U256::from(1));
    Ok(validate_amount(input, bounds)?)
}

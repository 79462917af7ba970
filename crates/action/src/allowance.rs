use crate::{ensure_nonzero_address, Action, DispatchError};
use alloy_primitives::Address;
use client::{ActionKind, WriteCall};
use config::UnitConvention;
use validation::{validate_address, validate_amount, Amount, AmountBounds};

/// Let `spender` move up to `amount` of the caller's tokens.
///
/// A zero amount is allowed and revokes the allowance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approve {
    pub spender: Address,
    pub amount: Amount,
}

impl Approve {
    pub fn parse(
        spender: &str,
        amount: &str,
        units: &UnitConvention,
    ) -> Result<Self, DispatchError> {
        Ok(Self {
            spender: validate_address(spender)?,
            amount: validate_amount(amount, AmountBounds::new(units.token_decimals))?,
        })
    }
}

impl Action for Approve {
    const KIND: ActionKind = ActionKind::Approve;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_nonzero_address(Self::KIND, "spender", self.spender)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::Approve {
            spender: self.spender,
            amount: self.amount.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Approve {} to spend {} tokens", self.spender, self.amount)
    }
}

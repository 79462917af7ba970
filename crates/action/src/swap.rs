//! Swaps between the native currency and the token at the contract's rate.
//! Both require the caller to be whitelisted.

use crate::{ensure_positive, positive_amount, Action, DispatchError};
use client::{ActionKind, WriteCall};
use config::UnitConvention;
use validation::Amount;

/// Buy tokens by attaching native currency to the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetToken {
    /// Attached value
    pub value: Amount,
}

impl GetToken {
    /// Scale by `native_decimals`.
    pub fn parse(value: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        Ok(Self {
            value: positive_amount(value, units.native_decimals)?,
        })
    }
}

impl Action for GetToken {
    const KIND: ActionKind = ActionKind::GetToken;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_positive(Self::KIND, "value", &self.value)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::GetToken {
            value: self.value.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Swap {} native for tokens", self.value)
    }
}

/// Sell tokens for native currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEth {
    pub amount: Amount,
}

impl GetEth {
    pub fn parse(amount: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        Ok(Self {
            amount: positive_amount(amount, units.token_decimals)?,
        })
    }
}

impl Action for GetEth {
    const KIND: ActionKind = ActionKind::GetEth;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_positive(Self::KIND, "amount", &self.amount)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::GetEth {
            amount: self.amount.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Swap {} tokens for native", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn test_get_token_uses_native_decimals() {
        let units = UnitConvention {
            token_decimals: 6,
            ..UnitConvention::standard()
        };
        let action = GetToken::parse("0.01", &units).unwrap();
        assert_eq!(action.description(), "Swap 0.01 native for tokens");
        assert_eq!(
            action.into_call(),
            WriteCall::GetToken {
                value: U256::from(10_000_000_000_000_000u128)
            }
        );
    }

    #[test]
    fn test_get_eth_uses_token_decimals() {
        let units = UnitConvention {
            token_decimals: 6,
            ..UnitConvention::standard()
        };
        let call = GetEth::parse("3", &units).unwrap().into_call();
        assert_eq!(
            call,
            WriteCall::GetEth {
                amount: U256::from(3_000_000)
            }
        );
        assert!(GetEth::parse("0", &units).is_err());
    }
}

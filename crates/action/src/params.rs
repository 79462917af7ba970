//! Owner-only contract parameters.

use crate::{
    ensure_nonzero_address, ensure_positive, invalid, positive_amount, Action, DispatchError,
};
use alloy_primitives::{Address, U256};
use client::{ActionKind, WriteCall};
use config::UnitConvention;
use validation::{format_base_units, validate_address, validate_amount, Amount, AmountBounds};

/// Set the transfer tax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTax {
    pub value: Amount,
    /// Upper bound in base units
    pub max: U256,
}

impl SetTax {
    /// Scale by `tax_decimals`, capped at `max_tax`.
    pub fn parse(value: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        let max = units.max_tax_base_units();
        let bounds = AmountBounds::new(units.tax_decimals).with_max(max);
        Ok(Self {
            value: validate_amount(value, bounds)?,
            max,
        })
    }
}

impl Action for SetTax {
    const KIND: ActionKind = ActionKind::SetTax;

    fn validate(&self) -> Result<(), DispatchError> {
        if self.value.base_units() > self.max {
            return Err(invalid(
                Self::KIND,
                format!(
                    "tax above the maximum of {}",
                    format_base_units(self.max, self.value.decimals())
                ),
            ));
        }
        Ok(())
    }

    fn into_call(self) -> WriteCall {
        WriteCall::SetTax {
            value: self.value.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Set tax to {}", self.value)
    }
}

/// Set the account that receives the tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTaxReceiver {
    pub receiver: Address,
}

impl SetTaxReceiver {
    pub fn parse(receiver: &str) -> Result<Self, DispatchError> {
        Ok(Self {
            receiver: validate_address(receiver)?,
        })
    }
}

impl Action for SetTaxReceiver {
    const KIND: ActionKind = ActionKind::SetTaxReceiver;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_nonzero_address(Self::KIND, "receiver", self.receiver)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::SetTaxReceiver {
            receiver: self.receiver,
        }
    }

    fn description(&self) -> String {
        format!("Send tax to {}", self.receiver)
    }
}

/// Set the native-to-token swap rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRate {
    pub rate: Amount,
}

impl SetRate {
    /// Scale by `rate_decimals` (18 by default, i.e. ether units).
    pub fn parse(rate: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        Ok(Self {
            rate: positive_amount(rate, units.rate_decimals)?,
        })
    }
}

impl Action for SetRate {
    const KIND: ActionKind = ActionKind::SetRate;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_positive(Self::KIND, "rate", &self.rate)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::SetRate {
            rate: self.rate.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Set swap rate to {}", self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validation::{AmountReason, ValidationError};

    #[test]
    fn test_set_tax_whole_percent() {
        let action = SetTax::parse("5", &UnitConvention::standard()).unwrap();
        assert!(action.validate().is_ok());
        assert_eq!(action.description(), "Set tax to 5");
        assert_eq!(
            action.into_call(),
            WriteCall::SetTax {
                value: U256::from(5)
            }
        );
    }

    #[test]
    fn test_set_tax_bounds() {
        let units = UnitConvention::standard();
        assert!(SetTax::parse("0", &units).is_ok());
        assert!(SetTax::parse("100", &units).is_ok());
        assert!(matches!(
            SetTax::parse("101", &units),
            Err(DispatchError::Validation(ValidationError::InvalidAmount {
                reason: AmountReason::AboveMax { .. },
                ..
            }))
        ));
        // Whole percent only by default
        assert!(SetTax::parse("2.5", &units).is_err());

        let over = SetTax {
            value: Amount::from_base_units(U256::from(150), 0),
            max: U256::from(100),
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_set_tax_basis_points() {
        let units = UnitConvention {
            tax_decimals: 2,
            max_tax: 10,
            ..UnitConvention::standard()
        };
        let call = SetTax::parse("2.5", &units).unwrap().into_call();
        assert_eq!(
            call,
            WriteCall::SetTax {
                value: U256::from(250)
            }
        );
        assert!(SetTax::parse("10.01", &units).is_err());
    }

    #[test]
    fn test_set_tax_with_oversized_decimals_is_rejected() {
        let units = UnitConvention {
            tax_decimals: 78,
            ..UnitConvention::standard()
        };
        assert!(matches!(
            SetTax::parse("1", &units),
            Err(DispatchError::Validation(ValidationError::InvalidAmount {
                reason: AmountReason::Overflow,
                ..
            }))
        ));
    }

    #[test]
    fn test_set_rate_scales_like_ether() {
        let call = SetRate::parse("0.001", &UnitConvention::standard())
            .unwrap()
            .into_call();
        assert_eq!(
            call,
            WriteCall::SetRate {
                rate: U256::from(1_000_000_000_000_000u128)
            }
        );
        assert!(SetRate::parse("0", &UnitConvention::standard()).is_err());
    }

    #[test]
    fn test_set_tax_receiver() {
        let action = SetTaxReceiver::parse("0x1111111111111111111111111111111111111111").unwrap();
        assert!(action.validate().is_ok());

        let zero = SetTaxReceiver {
            receiver: Address::ZERO,
        };
        assert!(zero.validate().is_err());
        assert!(SetTaxReceiver::parse("0x11").is_err());
    }
}

//! Unit conventions of the token contract.
//!
//! Every amount the user types is a human-readable decimal. Before it is sent,
//! it is multiplied by `10^decimals`, where `decimals` depends on what the
//! argument means to the contract:
//!
//! | argument                                    | decimals          |
//! |---------------------------------------------|-------------------|
//! | token amounts (mint, burn, approve, airdrop, getEth) | `token_decimals`  |
//! | native value attached to `getToken`         | `native_decimals` |
//! | swap rate passed to `setRate`               | `rate_decimals`   |
//! | tax passed to `setTax`                      | `tax_decimals`    |

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Largest exponent for which `10^decimals` fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConvention {
    /// Decimals of the token itself
    pub token_decimals: u8,
    /// Decimals of the chain's native currency (18 for ether)
    pub native_decimals: u8,
    /// Fixed-point decimals of the swap rate
    pub rate_decimals: u8,
    /// Fixed-point decimals of the tax value
    pub tax_decimals: u8,
    /// Upper bound for the tax, in human units
    pub max_tax: u64,
}

impl Default for UnitConvention {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnitConvention {
    /// 18-decimal token, ether, 18-decimal rate, whole-percent tax.
    pub const fn standard() -> Self {
        Self {
            token_decimals: 18,
            native_decimals: 18,
            rate_decimals: 18,
            tax_decimals: 0,
            max_tax: 100,
        }
    }

    /// `10^decimals` as a `U256`, or `None` above [`MAX_DECIMALS`].
    pub fn scaling_factor(decimals: u8) -> Option<U256> {
        U256::from(10).checked_pow(U256::from(decimals))
    }

    /// Largest tax accepted by `setTax`, in base units. Saturates at
    /// `U256::MAX` when the scaled bound does not fit.
    pub fn max_tax_base_units(&self) -> U256 {
        let max_tax = U256::from(self.max_tax);
        match Self::scaling_factor(self.tax_decimals) {
            Some(factor) => max_tax.saturating_mul(factor),
            None if max_tax.is_zero() => U256::ZERO,
            None => U256::MAX,
        }
    }

    /// The decimals fields that exceed [`MAX_DECIMALS`], by name.
    pub fn oversized_fields(&self) -> Vec<&'static str> {
        [
            ("token_decimals", self.token_decimals),
            ("native_decimals", self.native_decimals),
            ("rate_decimals", self.rate_decimals),
            ("tax_decimals", self.tax_decimals),
        ]
        .into_iter()
        .filter(|(_, decimals)| *decimals > MAX_DECIMALS)
        .map(|(name, _)| name)
        .collect()
    }
}

use crate::{AmountReason, ValidationError};
use alloy_primitives::U256;
use std::fmt;

/// A validated amount, held exactly in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount {
    base_units: U256,
    decimals: u8,
}

impl Amount {
    pub const fn from_base_units(base_units: U256, decimals: u8) -> Self {
        Self {
            base_units,
            decimals,
        }
    }

    /// The value multiplied by `10^decimals`, ready for submission.
    pub const fn base_units(&self) -> U256 {
        self.base_units
    }

    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.base_units.is_zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_base_units(self.base_units, self.decimals))
    }
}

/// Constraints for [`validate_amount`]. `min` and `max` are in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBounds {
    pub min: Option<U256>,
    pub max: Option<U256>,
    pub decimals: u8,
}

impl AmountBounds {
    pub const fn new(decimals: u8) -> Self {
        Self {
            min: None,
            max: None,
            decimals,
        }
    }

    pub const fn with_min(mut self, min: U256) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn with_max(mut self, max: U256) -> Self {
        self.max = Some(max);
        self
    }
}

/// Validate a human-readable decimal amount and scale it to base units.
///
/// Accepts digits with at most one `.`, no sign, exponent, or grouping. At most
/// `bounds.decimals` fractional digits are allowed; the result must lie within
/// `[min, max]` when those are set.
pub fn validate_amount(input: &str, bounds: AmountBounds) -> Result<Amount, ValidationError> {
    let reject = |reason| ValidationError::InvalidAmount {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(reject(AmountReason::Empty));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(reject(AmountReason::Malformed));
    }

    if fraction.len() > usize::from(bounds.decimals) {
        return Err(reject(AmountReason::TooManyDecimals {
            max: bounds.decimals,
        }));
    }

    let base_units = scale(whole, fraction, bounds.decimals)
        .ok_or_else(|| reject(AmountReason::Overflow))?;

    if let Some(min) = bounds.min {
        if base_units < min {
            return Err(reject(AmountReason::BelowMin {
                min: format_base_units(min, bounds.decimals),
            }));
        }
    }

    if let Some(max) = bounds.max {
        if base_units > max {
            return Err(reject(AmountReason::AboveMax {
                max: format_base_units(max, bounds.decimals),
            }));
        }
    }

    Ok(Amount::from_base_units(base_units, bounds.decimals))
}

/// `whole.fraction * 10^decimals`, or `None` on overflow.
fn scale(whole: &str, fraction: &str, decimals: u8) -> Option<U256> {
    let factor = U256::from(10).checked_pow(U256::from(decimals))?;
    let whole = parse_digits(whole)?;

    let padding = usize::from(decimals) - fraction.len();
    let fraction = parse_digits(fraction)?
        .checked_mul(U256::from(10).checked_pow(U256::from(padding))?)?;

    whole.checked_mul(factor)?.checked_add(fraction)
}

fn parse_digits(digits: &str) -> Option<U256> {
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).ok()
}

/// Render base units as a decimal string without trailing zeros.
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

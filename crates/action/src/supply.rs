//! Token supply changes: mint, burn and airdrop.

use crate::{
    ensure_nonzero_address, ensure_positive, invalid, positive_amount, Action, DispatchError,
};
use alloy_primitives::Address;
use client::{ActionKind, WriteCall};
use config::UnitConvention;
use tracing::debug;
use validation::{split_address_list, Amount};

/// Mint tokens to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mint {
    pub amount: Amount,
}

impl Mint {
    pub fn parse(amount: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        Ok(Self {
            amount: positive_amount(amount, units.token_decimals)?,
        })
    }
}

impl Action for Mint {
    const KIND: ActionKind = ActionKind::Mint;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_positive(Self::KIND, "amount", &self.amount)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::Mint {
            amount: self.amount.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Mint {} tokens", self.amount)
    }
}

/// Burn tokens held by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Burn {
    pub amount: Amount,
}

impl Burn {
    pub fn parse(amount: &str, units: &UnitConvention) -> Result<Self, DispatchError> {
        Ok(Self {
            amount: positive_amount(amount, units.token_decimals)?,
        })
    }
}

impl Action for Burn {
    const KIND: ActionKind = ActionKind::Burn;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_positive(Self::KIND, "amount", &self.amount)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::Burn {
            amount: self.amount.base_units(),
        }
    }

    fn description(&self) -> String {
        format!("Burn {} tokens", self.amount)
    }
}

/// Send the same amount to every recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Airdrop {
    pub recipients: Vec<Address>,
    /// Amount each recipient receives
    pub amount: Amount,
}

impl Airdrop {
    /// Parse a `separator`-separated recipient list and a per-recipient amount.
    ///
    /// Malformed entries are dropped; the list must still contain at least one
    /// address afterwards.
    pub fn parse(
        recipients: &str,
        separator: &str,
        amount: &str,
        units: &UnitConvention,
    ) -> Result<Self, DispatchError> {
        let (recipients, rejected) = split_address_list(recipients, separator);
        if !rejected.is_empty() {
            debug!(
                kept = recipients.len(),
                dropped = rejected.len(),
                "Dropped malformed airdrop recipients"
            );
        }

        if recipients.is_empty() {
            return Err(invalid(Self::KIND, "no valid recipients"));
        }

        Ok(Self {
            recipients,
            amount: positive_amount(amount, units.token_decimals)?,
        })
    }
}

impl Action for Airdrop {
    const KIND: ActionKind = ActionKind::Airdrop;

    fn validate(&self) -> Result<(), DispatchError> {
        if self.recipients.is_empty() {
            return Err(invalid(Self::KIND, "no valid recipients"));
        }
        for recipient in &self.recipients {
            ensure_nonzero_address(Self::KIND, "recipient", *recipient)?;
        }
        ensure_positive(Self::KIND, "amount", &self.amount)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::Airdrop {
            recipients: self.recipients,
            amount: self.amount.base_units(),
        }
    }

    fn description(&self) -> String {
        format!(
            "Airdrop {} tokens to each of {} recipients",
            self.amount,
            self.recipients.len()
        )
    }
}

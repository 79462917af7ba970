//! Whitelist and admin membership.

use crate::{ensure_nonzero_address, Action, DispatchError};
use alloy_primitives::Address;
use client::{ActionKind, WriteCall};
use validation::validate_address;

/// Add `account` to the whitelist, or remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetWhitelist {
    pub account: Address,
    pub status: bool,
}

impl SetWhitelist {
    pub fn parse(account: &str, status: bool) -> Result<Self, DispatchError> {
        Ok(Self {
            account: validate_address(account)?,
            status,
        })
    }
}

impl Action for SetWhitelist {
    const KIND: ActionKind = ActionKind::SetWhitelist;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_nonzero_address(Self::KIND, "account", self.account)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::SetWhitelist {
            account: self.account,
            status: self.status,
        }
    }

    fn description(&self) -> String {
        if self.status {
            format!("Whitelist {}", self.account)
        } else {
            format!("Remove {} from the whitelist", self.account)
        }
    }
}

/// Grant or revoke admin rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAdmin {
    pub account: Address,
    pub status: bool,
}

impl SetAdmin {
    pub fn parse(account: &str, status: bool) -> Result<Self, DispatchError> {
        Ok(Self {
            account: validate_address(account)?,
            status,
        })
    }
}

impl Action for SetAdmin {
    const KIND: ActionKind = ActionKind::SetAdmin;

    fn validate(&self) -> Result<(), DispatchError> {
        ensure_nonzero_address(Self::KIND, "account", self.account)
    }

    fn into_call(self) -> WriteCall {
        WriteCall::SetAdmin {
            account: self.account,
            status: self.status,
        }
    }

    fn description(&self) -> String {
        if self.status {
            format!("Grant admin to {}", self.account)
        } else {
            format!("Revoke admin from {}", self.account)
        }
    }
}

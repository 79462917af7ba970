//! Field-level view of the contract.
//!
//! Only [`crate::ReadAggregator`] mutates a [`ContractSnapshot`]; everything
//! else reads clones of it from a watch channel.

use alloy_primitives::{Address, U256};
use client::ReadField;
use session::AccountState;
use std::{collections::BTreeMap, time::SystemTime};

/// Value of a single read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadValue {
    Uint(U256),
    Address(Address),
    Bool(bool),
}

/// How far a field can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// A read is in flight; the last value (if any) is still shown.
    Pending,
    /// The last read succeeded.
    Fresh,
    /// The account changed and the read for the new account has not landed.
    /// No value is held.
    StaleAccountMismatch,
    /// The last read failed. The previous value for the same account, if any,
    /// is retained.
    Failed,
    /// Account-scoped read skipped because no account is connected.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub value: Option<ReadValue>,
    pub freshness: Freshness,
    pub fetched_at: Option<SystemTime>,
    /// Account the value was fetched for; `None` for contract-wide reads.
    pub fetched_for: Option<Address>,
    pub error: Option<String>,
    generation: u64,
}

impl FieldState {
    const fn new() -> Self {
        Self {
            value: None,
            freshness: Freshness::Pending,
            fetched_at: None,
            fetched_for: None,
            error: None,
            generation: 0,
        }
    }

    fn clear(&mut self, freshness: Freshness) {
        self.value = None;
        self.fetched_at = None;
        self.fetched_for = None;
        self.error = None;
        self.freshness = freshness;
    }
}

/// The result of one read, tagged with what it was issued for.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub field: ReadField,
    pub generation: u64,
    pub epoch: u64,
    pub account: Option<Address>,
    pub fetched_at: SystemTime,
    pub result: Result<ReadValue, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot {
    account: Option<Address>,
    epoch: u64,
    generation: u64,
    fields: BTreeMap<ReadField, FieldState>,
}

impl Default for ContractSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractSnapshot {
    pub fn new() -> Self {
        let mut fields: BTreeMap<ReadField, FieldState> = ReadField::ALL
            .into_iter()
            .map(|field| (field, FieldState::new()))
            .collect();
        for (_, state) in fields.iter_mut().filter(|(f, _)| f.is_account_scoped()) {
            state.freshness = Freshness::Absent;
        }

        Self {
            account: None,
            epoch: 0,
            generation: 0,
            fields,
        }
    }

    /// Account the account-scoped fields are bound to.
    pub const fn account(&self) -> Option<Address> {
        self.account
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of refreshes started so far.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Bind account-scoped fields to `active`.
    ///
    /// When the tenure changed, their values are dropped and they are marked
    /// [`Freshness::StaleAccountMismatch`] (or [`Freshness::Absent`] when
    /// disconnected). Returns whether anything changed.
    pub fn rebind(&mut self, active: AccountState) -> bool {
        if self.epoch == active.epoch && self.account == active.account {
            return false;
        }

        self.account = active.account;
        self.epoch = active.epoch;

        let freshness = if active.account.is_some() {
            Freshness::StaleAccountMismatch
        } else {
            Freshness::Absent
        };
        for (_, state) in self.fields.iter_mut().filter(|(f, _)| f.is_account_scoped()) {
            state.clear(freshness);
        }

        true
    }

    /// Start a new refresh for `active`. Every field that will be read goes
    /// to [`Freshness::Pending`] (or stays mismatched after an account change)
    /// and only accepts results from this refresh from now on.
    ///
    /// Returns the refresh generation.
    pub fn begin_refresh(&mut self, active: AccountState) -> u64 {
        let switched = self.rebind(active);
        self.generation += 1;

        for (field, state) in &mut self.fields {
            state.generation = self.generation;
            if !field.is_account_scoped() || (active.account.is_some() && !switched) {
                state.freshness = Freshness::Pending;
            }
        }

        self.generation
    }

    /// Merge one read result. Returns `false` if it was discarded because a
    /// newer refresh superseded it or it belongs to another account tenure.
    pub fn apply(&mut self, outcome: ReadOutcome, active: AccountState) -> bool {
        let Some(state) = self.fields.get_mut(&outcome.field) else {
            return false;
        };

        if outcome.generation != state.generation {
            return false;
        }

        if outcome.field.is_account_scoped()
            && (outcome.epoch != active.epoch
                || outcome.epoch != self.epoch
                || outcome.account != self.account
                || outcome.account.is_none())
        {
            return false;
        }

        match outcome.result {
            Ok(value) => {
                state.value = Some(value);
                state.freshness = Freshness::Fresh;
                state.fetched_at = Some(outcome.fetched_at);
                state.fetched_for = if outcome.field.is_account_scoped() {
                    outcome.account
                } else {
                    None
                };
                state.error = None;
            }
            Err(reason) => {
                state.freshness = Freshness::Failed;
                state.error = Some(reason);
            }
        }

        true
    }

    pub fn field(&self, field: ReadField) -> &FieldState {
        // Every ReadField is inserted in `new`.
        &self.fields[&field]
    }

    pub fn fields(&self) -> impl Iterator<Item = (ReadField, &FieldState)> {
        self.fields.iter().map(|(f, s)| (*f, s))
    }

    /// No read is outstanding.
    pub fn is_settled(&self) -> bool {
        self.fields.values().all(|s| {
            !matches!(
                s.freshness,
                Freshness::Pending | Freshness::StaleAccountMismatch
            )
        })
    }

    pub fn failed_fields(&self) -> Vec<ReadField> {
        self.fields()
            .filter(|(_, s)| s.freshness == Freshness::Failed)
            .map(|(f, _)| f)
            .collect()
    }

    pub fn rate(&self) -> Option<U256> {
        self.uint(ReadField::Rate)
    }

    pub fn tax(&self) -> Option<U256> {
        self.uint(ReadField::Tax)
    }

    pub fn tax_receiver(&self) -> Option<Address> {
        match self.field(ReadField::TaxReceiver).value {
            Some(ReadValue::Address(a)) => Some(a),
            _ => None,
        }
    }

    pub fn owner(&self) -> Option<Address> {
        match self.field(ReadField::Owner).value {
            Some(ReadValue::Address(a)) => Some(a),
            _ => None,
        }
    }

    /// Whitelist flag, only if it was fetched for `account`.
    pub fn is_whitelist(&self, account: Address) -> Option<bool> {
        match self.scoped(ReadField::IsWhitelist, account) {
            Some(ReadValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// Admin flag, only if it was fetched for `account`.
    pub fn is_admin(&self, account: Address) -> Option<bool> {
        match self.scoped(ReadField::IsAdmin, account) {
            Some(ReadValue::Bool(b)) => Some(b),
            _ => None,
        }
    }

    pub fn native_balance(&self, account: Address) -> Option<U256> {
        match self.scoped(ReadField::NativeBalance, account) {
            Some(ReadValue::Uint(v)) => Some(v),
            _ => None,
        }
    }

    pub fn token_balance(&self, account: Address) -> Option<U256> {
        match self.scoped(ReadField::TokenBalance, account) {
            Some(ReadValue::Uint(v)) => Some(v),
            _ => None,
        }
    }

    fn uint(&self, field: ReadField) -> Option<U256> {
        match self.field(field).value {
            Some(ReadValue::Uint(v)) => Some(v),
            _ => None,
        }
    }

    fn scoped(&self, field: ReadField, account: Address) -> Option<ReadValue> {
        let state = self.field(field);
        if self.account != Some(account) || state.fetched_for != Some(account) {
            return None;
        }
        state.value
    }
}

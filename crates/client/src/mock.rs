//! In-memory [`ContractClient`] for tests.
//!
//! Holds a small model of the contract state that writes are applied to, and
//! lets a test hold reads or submissions in flight, or make them fail.

use crate::contract::{ContractClient, ReadField, TxReceipt, WriteCall};
use alloy_primitives::{Address, TxHash, U256};
use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;

/// Contract state as seen by the mock.
#[derive(Debug, Clone)]
pub struct ChainState {
    pub owner: Address,
    pub rate: U256,
    pub tax: U256,
    pub tax_receiver: Address,
    pub decimals: u8,
    pub whitelist: HashSet<Address>,
    pub admins: HashSet<Address>,
    pub native_balances: HashMap<Address, U256>,
    pub token_balances: HashMap<Address, U256>,
}

impl ChainState {
    fn new(owner: Address) -> Self {
        Self {
            owner,
            rate: U256::from(10).pow(U256::from(18)),
            tax: U256::ZERO,
            tax_receiver: owner,
            decimals: 18,
            whitelist: HashSet::new(),
            admins: HashSet::new(),
            native_balances: HashMap::new(),
            token_balances: HashMap::new(),
        }
    }

    fn apply(&mut self, sender: Address, call: &WriteCall) {
        match call {
            WriteCall::Mint { amount } => {
                let balance = self.token_balances.entry(sender).or_default();
                *balance = balance.saturating_add(*amount);
            }
            WriteCall::Burn { amount } | WriteCall::GetEth { amount } => {
                let balance = self.token_balances.entry(sender).or_default();
                *balance = balance.saturating_sub(*amount);
            }
            WriteCall::Approve { .. } => {}
            WriteCall::Airdrop { recipients, amount } => {
                for recipient in recipients {
                    let balance = self.token_balances.entry(*recipient).or_default();
                    *balance = balance.saturating_add(*amount);
                }
            }
            WriteCall::SetWhitelist { account, status } => {
                if *status {
                    self.whitelist.insert(*account);
                } else {
                    self.whitelist.remove(account);
                }
            }
            WriteCall::SetAdmin { account, status } => {
                if *status {
                    self.admins.insert(*account);
                } else {
                    self.admins.remove(account);
                }
            }
            WriteCall::SetTax { value } => self.tax = *value,
            WriteCall::SetTaxReceiver { receiver } => self.tax_receiver = *receiver,
            WriteCall::SetRate { rate } => self.rate = *rate,
            WriteCall::GetToken { value } => {
                let one = U256::from(10).pow(U256::from(18));
                let minted = value.saturating_mul(self.rate) / one;
                let balance = self.token_balances.entry(sender).or_default();
                *balance = balance.saturating_add(minted);
            }
        }
    }
}

/// Test double for [`ContractClient`].
#[derive(Debug)]
pub struct MockContract {
    state: Mutex<ChainState>,
    sender: Mutex<Address>,
    read_gates: Mutex<HashMap<Address, watch::Sender<bool>>>,
    submit_gate: watch::Sender<bool>,
    failing_reads: Mutex<HashSet<ReadField>>,
    submit_failure: Mutex<Option<String>>,
    submissions: Mutex<Vec<WriteCall>>,
    read_counts: Mutex<HashMap<ReadField, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockContract {
    /// A contract owned by `owner`; writes are sent from `owner` until
    /// [`Self::set_sender`] says otherwise.
    pub fn new(owner: Address) -> Self {
        let (submit_gate, _) = watch::channel(true);
        Self {
            state: Mutex::new(ChainState::new(owner)),
            sender: Mutex::new(owner),
            read_gates: Mutex::new(HashMap::new()),
            submit_gate,
            failing_reads: Mutex::new(HashSet::new()),
            submit_failure: Mutex::new(None),
            submissions: Mutex::new(Vec::new()),
            read_counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_whitelisted(self, account: Address) -> Self {
        lock(&self.state).whitelist.insert(account);
        self
    }

    pub fn with_admin(self, account: Address) -> Self {
        lock(&self.state).admins.insert(account);
        self
    }

    pub fn with_native_balance(self, account: Address, amount: U256) -> Self {
        lock(&self.state).native_balances.insert(account, amount);
        self
    }

    pub fn with_token_balance(self, account: Address, amount: U256) -> Self {
        lock(&self.state).token_balances.insert(account, amount);
        self
    }

    pub fn with_tax(self, tax: U256) -> Self {
        lock(&self.state).tax = tax;
        self
    }

    /// Snapshot of the modelled contract state.
    pub fn state(&self) -> ChainState {
        lock(&self.state).clone()
    }

    /// Account that subsequent writes are applied as.
    pub fn set_sender(&self, sender: Address) {
        *lock(&self.sender) = sender;
    }

    /// Block account-scoped reads for `account` until released.
    pub fn hold_reads_for(&self, account: Address) {
        let (gate, _) = watch::channel(false);
        lock(&self.read_gates).insert(account, gate);
    }

    pub fn release_reads_for(&self, account: Address) {
        if let Some(gate) = lock(&self.read_gates).remove(&account) {
            gate.send_replace(true);
        }
    }

    /// Block submissions (after they are recorded) until released.
    pub fn hold_submissions(&self) {
        self.submit_gate.send_replace(false);
    }

    pub fn release_submissions(&self) {
        self.submit_gate.send_replace(true);
    }

    pub fn fail_read(&self, field: ReadField) {
        lock(&self.failing_reads).insert(field);
    }

    pub fn restore_read(&self, field: ReadField) {
        lock(&self.failing_reads).remove(&field);
    }

    /// Make every following submission fail with `reason`.
    pub fn fail_submissions(&self, reason: impl Into<String>) {
        *lock(&self.submit_failure) = Some(reason.into());
    }

    pub fn restore_submissions(&self) {
        *lock(&self.submit_failure) = None;
    }

    /// Every call that reached [`ContractClient::submit`], in order.
    pub fn submissions(&self) -> Vec<WriteCall> {
        lock(&self.submissions).clone()
    }

    /// Number of times `field` was read.
    pub fn read_count(&self, field: ReadField) -> usize {
        lock(&self.read_counts).get(&field).copied().unwrap_or_default()
    }

    async fn read<T>(
        &self,
        field: ReadField,
        account: Option<Address>,
        get: impl FnOnce(&ChainState) -> T + Send,
    ) -> eyre::Result<T> {
        *lock(&self.read_counts).entry(field).or_default() += 1;

        if let Some(account) = account {
            let gate = lock(&self.read_gates).get(&account).map(watch::Sender::subscribe);
            if let Some(mut gate) = gate {
                let _ = gate.wait_for(|open| *open).await;
            }
        }

        if lock(&self.failing_reads).contains(&field) {
            eyre::bail!("mock read {field} failed");
        }

        let state = lock(&self.state);
        Ok(get(&state))
    }
}

impl ContractClient for MockContract {
    async fn rate(&self) -> eyre::Result<U256> {
        self.read(ReadField::Rate, None, |s| s.rate).await
    }

    async fn tax(&self) -> eyre::Result<U256> {
        self.read(ReadField::Tax, None, |s| s.tax).await
    }

    async fn tax_receiver(&self) -> eyre::Result<Address> {
        self.read(ReadField::TaxReceiver, None, |s| s.tax_receiver).await
    }

    async fn owner(&self) -> eyre::Result<Address> {
        self.read(ReadField::Owner, None, |s| s.owner).await
    }

    async fn is_whitelist(&self, account: Address) -> eyre::Result<bool> {
        self.read(ReadField::IsWhitelist, Some(account), move |s| {
            s.whitelist.contains(&account)
        })
        .await
    }

    async fn is_admin(&self, account: Address) -> eyre::Result<bool> {
        self.read(ReadField::IsAdmin, Some(account), move |s| {
            s.admins.contains(&account)
        })
        .await
    }

    async fn native_balance(&self, account: Address) -> eyre::Result<U256> {
        self.read(ReadField::NativeBalance, Some(account), move |s| {
            s.native_balances.get(&account).copied().unwrap_or_default()
        })
        .await
    }

    async fn token_balance(&self, account: Address) -> eyre::Result<U256> {
        self.read(ReadField::TokenBalance, Some(account), move |s| {
            s.token_balances.get(&account).copied().unwrap_or_default()
        })
        .await
    }

    async fn decimals(&self) -> eyre::Result<u8> {
        Ok(lock(&self.state).decimals)
    }

    async fn submit(&self, call: WriteCall) -> eyre::Result<TxReceipt> {
        let nonce = {
            let mut submissions = lock(&self.submissions);
            submissions.push(call.clone());
            submissions.len()
        };

        let mut gate = self.submit_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let failure = lock(&self.submit_failure).clone();
        if let Some(reason) = failure {
            eyre::bail!(reason);
        }

        let sender = *lock(&self.sender);
        lock(&self.state).apply(sender, &call);

        Ok(TxReceipt {
            tx_hash: TxHash::with_last_byte(nonce as u8),
            block_number: Some(nonce as u64),
            gas_used: 21_000,
        })
    }
}

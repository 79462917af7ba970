//! Token contract controller.
//!
//! [`Controller`] wires the session, the read aggregator and the write
//! dispatcher around one shared [`ContractClient`], and exposes every write
//! action as a method taking raw form input.

pub mod config;
pub mod metrics;
pub mod report;

use crate::{config::UnitConvention, metrics::Metrics};
use action::{
    Action, Airdrop, Approve, Burn, DispatchError, Dispatcher, GetEth, GetToken, Mint,
    PendingTransaction, SetAdmin, SetRate, SetTax, SetTaxReceiver, SetWhitelist,
};
use alloy_primitives::Address;
use binding::abi::FunctionTable;
use client::{ActionKind, ContractClient};
use session::{Session, SessionError, WalletProvider};
use snapshot::{resolve, ContractSnapshot, ReadAggregator, RetryPolicy, Role};
use std::{
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use validation::DEFAULT_SEPARATOR;

pub struct Controller<C> {
    session: Session,
    aggregator: ReadAggregator<C>,
    dispatcher: Dispatcher<C>,
    units: UnitConvention,
    list_separator: String,
    metrics: Metrics,
}

impl<C> Controller<C>
where
    C: ContractClient,
{
    pub fn new(client: Arc<C>, units: UnitConvention) -> Self {
        let oversized = units.oversized_fields();
        if !oversized.is_empty() {
            warn!(fields = ?oversized, "Decimals too large, amounts scaled by them are rejected");
        }

        let session = Session::new();
        let aggregator = ReadAggregator::new(client.clone(), &session);
        let dispatcher = Dispatcher::new(client, aggregator.refresh_trigger());

        Self {
            session,
            aggregator,
            dispatcher,
            units,
            list_separator: DEFAULT_SEPARATOR.to_string(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.aggregator = self.aggregator.with_retry(retry);
        self
    }

    pub fn with_list_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn aggregator(&self) -> &ReadAggregator<C> {
        &self.aggregator
    }

    pub const fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub const fn units(&self) -> &UnitConvention {
        &self.units
    }

    pub async fn connect<W: WalletProvider>(&self, wallet: &W) -> Result<Address, SessionError> {
        let account = self.session.connect(wallet).await?;
        self.metrics.set_connected(true);
        Ok(account)
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
        self.metrics.set_connected(false);
    }

    pub fn switch_account(&self, account: Address) {
        self.session.switch_account(account);
    }

    /// Refresh the snapshot for the current account and record metrics.
    pub async fn refresh(&self) -> ContractSnapshot {
        let start = Instant::now();
        self.aggregator.sync_account();
        let snapshot = self.aggregator.refresh().await;

        self.metrics
            .record_refresh(start.elapsed(), &snapshot.failed_fields());
        self.metrics.set_role(resolve(self.session.account(), &snapshot));

        snapshot
    }

    /// Keep the snapshot current until the session is dropped, recording
    /// metrics for every refresh that settles.
    pub async fn run(&self, poll_interval: Duration) {
        let mut updates = self.aggregator.subscribe();

        let observe = async {
            let mut started: Option<(u64, Instant)> = None;
            let mut reported = 0;

            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                let generation = snapshot.generation();

                if !snapshot.is_settled() {
                    if started.map(|(g, _)| g) != Some(generation) {
                        started = Some((generation, Instant::now()));
                    }
                    continue;
                }

                if generation != reported {
                    reported = generation;
                    let elapsed = started
                        .filter(|(g, _)| *g == generation)
                        .map(|(_, at)| at.elapsed())
                        .unwrap_or_default();
                    self.metrics.record_refresh(elapsed, &snapshot.failed_fields());
                    self.metrics.set_role(resolve(self.session.account(), &snapshot));
                }
            }
        };

        tokio::select! {
            _ = self.aggregator.run(poll_interval) => {}
            _ = observe => {}
        }
    }

    pub fn snapshot(&self) -> ContractSnapshot {
        self.aggregator.snapshot()
    }

    /// Role of the active account, from the current snapshot.
    pub fn role(&self) -> Role {
        resolve(self.session.account(), &self.aggregator.snapshot())
    }

    pub fn offered_actions(&self) -> Vec<ActionKind> {
        self.role().offered_actions()
    }

    pub fn last(&self, kind: ActionKind) -> Option<PendingTransaction> {
        self.dispatcher.last(kind)
    }

    pub async fn mint(&self, amount: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(Mint::parse(amount, &self.units)).await
    }

    pub async fn burn(&self, amount: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(Burn::parse(amount, &self.units)).await
    }

    pub async fn approve(
        &self,
        spender: &str,
        amount: &str,
    ) -> Result<PendingTransaction, DispatchError> {
        self.submit(Approve::parse(spender, amount, &self.units)).await
    }

    /// `recipients` is a list separated by the configured separator.
    pub async fn airdrop(
        &self,
        recipients: &str,
        amount: &str,
    ) -> Result<PendingTransaction, DispatchError> {
        self.submit(Airdrop::parse(recipients, &self.list_separator, amount, &self.units))
            .await
    }

    pub async fn set_whitelist(
        &self,
        account: &str,
        status: bool,
    ) -> Result<PendingTransaction, DispatchError> {
        self.submit(SetWhitelist::parse(account, status)).await
    }

    pub async fn set_admin(
        &self,
        account: &str,
        status: bool,
    ) -> Result<PendingTransaction, DispatchError> {
        self.submit(SetAdmin::parse(account, status)).await
    }

    pub async fn set_tax(&self, tax: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(SetTax::parse(tax, &self.units)).await
    }

    pub async fn set_tax_receiver(
        &self,
        receiver: &str,
    ) -> Result<PendingTransaction, DispatchError> {
        self.submit(SetTaxReceiver::parse(receiver)).await
    }

    pub async fn set_rate(&self, rate: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(SetRate::parse(rate, &self.units)).await
    }

    pub async fn get_token(&self, value: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(GetToken::parse(value, &self.units)).await
    }

    pub async fn get_eth(&self, amount: &str) -> Result<PendingTransaction, DispatchError> {
        self.submit(GetEth::parse(amount, &self.units)).await
    }

    async fn submit<A: Action>(
        &self,
        parsed: Result<A, DispatchError>,
    ) -> Result<PendingTransaction, DispatchError> {
        let kind = A::KIND;

        let role = self.role();
        if !role.offers(kind) {
            // The contract decides; the role only drives what is offered
            debug!(action = %kind, role = %role, "Submitting an action not offered to this role");
        }

        let result = match parsed {
            Ok(action) => self.dispatcher.dispatch(action).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(record) => self
                .metrics
                .record_dispatch(kind.as_str(), record.outcome.is_success()),
            Err(DispatchError::Busy(_)) => self.metrics.record_rejection(kind.as_str(), "busy"),
            Err(_) => self.metrics.record_rejection(kind.as_str(), "invalid"),
        }

        result
    }
}

/// Check the bindings against a compiled contract artifact.
pub fn verify_abi(path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();
    let artifact = std::fs::read_to_string(path)?;
    FunctionTable::new().verify(&artifact)?;

    info!(artifact = %path.display(), "Contract ABI matches bindings");
    Ok(())
}

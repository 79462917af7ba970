use crate::snapshot::{ContractSnapshot, ReadOutcome, ReadValue};
use alloy_primitives::Address;
use client::{ContractClient, ReadField};
use session::{AccountState, Session};
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::{
    sync::{watch, Notify},
    time::MissedTickBehavior,
};
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info, warn};

/// Per-read retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: usize,
    /// Base of the exponential backoff, in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 100,
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error.
    pub const fn none() -> Self {
        Self {
            attempts: 0,
            base_delay_ms: 0,
            max_delay: Duration::ZERO,
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.base_delay_ms)
            .max_delay(self.max_delay)
            .take(self.attempts)
    }
}

#[derive(Debug, Clone, Copy)]
struct ReadContext {
    generation: u64,
    epoch: u64,
    account: Option<Address>,
}

/// Issues the fixed read set and keeps a [`ContractSnapshot`] current.
///
/// Reads run concurrently; each one lands in the snapshot on its own as soon
/// as it completes, and subscribers are notified per field. Results for an
/// account that is no longer active are dropped.
pub struct ReadAggregator<C> {
    client: Arc<C>,
    session: watch::Receiver<AccountState>,
    snapshot: watch::Sender<ContractSnapshot>,
    refresh_requested: Arc<Notify>,
    retry: RetryPolicy,
}

impl<C> ReadAggregator<C>
where
    C: ContractClient,
{
    pub fn new(client: Arc<C>, session: &Session) -> Self {
        let (snapshot, _) = watch::channel(ContractSnapshot::new());
        Self {
            client,
            session: session.subscribe(),
            snapshot,
            refresh_requested: Arc::new(Notify::new()),
            retry: RetryPolicy::default(),
        }
    }

    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Snapshot updates, one notification per landed field.
    pub fn subscribe(&self) -> watch::Receiver<ContractSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> ContractSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Signal used by writers to ask [`Self::run`] for an immediate refresh.
    pub fn refresh_trigger(&self) -> Arc<Notify> {
        self.refresh_requested.clone()
    }

    /// Rebind the snapshot to the session's current account, invalidating
    /// account-scoped fields if it changed. Returns whether it changed.
    pub fn sync_account(&self) -> bool {
        let active = *self.session.borrow();
        self.snapshot.send_if_modified(|s| s.rebind(active))
    }

    /// Read every field for the session's current account.
    ///
    /// Account-scoped reads are skipped when no account is connected. A failing
    /// read is retried per [`RetryPolicy`] and then recorded as failed without
    /// affecting its siblings.
    pub async fn refresh(&self) -> ContractSnapshot {
        let active = *self.session.borrow();

        let mut generation = 0;
        self.snapshot.send_modify(|s| generation = s.begin_refresh(active));

        debug!(
            generation,
            account = ?active.account,
            epoch = active.epoch,
            "Refreshing contract snapshot"
        );

        let ctx = ReadContext {
            generation,
            epoch: active.epoch,
            account: active.account,
        };
        let client = &self.client;

        let account_reads = async {
            let Some(account) = ctx.account else {
                return;
            };
            tokio::join!(
                self.fetch(ctx, ReadField::IsWhitelist, || async move {
                    client.is_whitelist(account).await.map(ReadValue::Bool)
                }),
                self.fetch(ctx, ReadField::IsAdmin, || async move {
                    client.is_admin(account).await.map(ReadValue::Bool)
                }),
                self.fetch(ctx, ReadField::NativeBalance, || async move {
                    client.native_balance(account).await.map(ReadValue::Uint)
                }),
                self.fetch(ctx, ReadField::TokenBalance, || async move {
                    client.token_balance(account).await.map(ReadValue::Uint)
                }),
            );
        };

        tokio::join!(
            self.fetch(ctx, ReadField::Rate, || async move {
                client.rate().await.map(ReadValue::Uint)
            }),
            self.fetch(ctx, ReadField::Tax, || async move {
                client.tax().await.map(ReadValue::Uint)
            }),
            self.fetch(ctx, ReadField::TaxReceiver, || async move {
                client.tax_receiver().await.map(ReadValue::Address)
            }),
            self.fetch(ctx, ReadField::Owner, || async move {
                client.owner().await.map(ReadValue::Address)
            }),
            account_reads,
        );

        // The account may have changed after the last read landed
        self.sync_account();

        let snapshot = self.snapshot();
        let failed = snapshot.failed_fields();
        if failed.is_empty() {
            debug!(generation, "Snapshot refreshed");
        } else {
            warn!(generation, failed = ?failed, "Snapshot refreshed with failed reads");
        }
        snapshot
    }

    async fn fetch<F, Fut>(&self, ctx: ReadContext, field: ReadField, mut read: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = eyre::Result<ReadValue>>,
    {
        let result = Retry::spawn(self.retry.strategy(), || {
            let attempt = read();
            async move {
                attempt.await.map_err(|e| {
                    warn!(field = %field, error = %e, "Read failed, will retry");
                    e
                })
            }
        })
        .await;

        let outcome = ReadOutcome {
            field,
            generation: ctx.generation,
            epoch: ctx.epoch,
            account: ctx.account,
            fetched_at: SystemTime::now(),
            result: result.map_err(|e| e.to_string()),
        };

        let active = *self.session.borrow();
        let mut applied = false;
        self.snapshot.send_if_modified(|s| {
            applied = s.apply(outcome, active);
            // Values of a previous account never outlive its tenure
            s.rebind(active) || applied
        });

        if !applied {
            debug!(
                field = %field,
                generation = ctx.generation,
                epoch = ctx.epoch,
                "Discarded read for a superseded refresh or account"
            );
        }
    }

    /// Keep the snapshot current until the session is dropped.
    ///
    /// Refreshes on account changes (abandoning a refresh still running for
    /// the previous account), on [`Self::refresh_trigger`], and every
    /// `poll_interval`.
    pub async fn run(&self, poll_interval: Duration) {
        let mut session = self.session.clone();
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        info!(poll_interval = ?poll_interval, "Snapshot driver started");

        loop {
            session.borrow_and_update();
            self.sync_account();

            tokio::select! {
                _ = self.refresh() => {}
                changed = session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Account changed during refresh, restarting");
                    continue;
                }
            }

            tokio::select! {
                changed = session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Account changed");
                }
                _ = self.refresh_requested.notified() => {
                    debug!("Refresh requested");
                }
                _ = interval.tick() => {}
            }
        }

        info!("Session closed, snapshot driver stopped");
    }
}

use crate::{Action, DispatchError};
use client::{ActionKind, ContractClient, TxReceipt, WriteCall};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// How a submitted transaction ended, or that it has not yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    InFlight,
    Succeeded(TxReceipt),
    /// Wallet rejection, node error or revert
    Failed(String),
    /// The dispatch was dropped before the submission resolved. The
    /// transaction may still be mined; check the chain before resubmitting.
    Abandoned,
}

impl Outcome {
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Record of one dispatched write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub kind: ActionKind,
    /// The call as submitted, amounts in base units
    pub params: WriteCall,
    pub description: String,
    pub submitted_at: SystemTime,
    pub outcome: Outcome,
}

/// Submits write actions, at most one in flight per [`ActionKind`].
///
/// The last record of every kind is retained and can be read with
/// [`Self::last`]. A successful submission wakes `refresh`.
pub struct Dispatcher<C> {
    client: Arc<C>,
    records: Mutex<HashMap<ActionKind, PendingTransaction>>,
    refresh: Arc<Notify>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C> Dispatcher<C>
where
    C: ContractClient,
{
    pub fn new(client: Arc<C>, refresh: Arc<Notify>) -> Self {
        Self {
            client,
            records: Mutex::new(HashMap::new()),
            refresh,
        }
    }

    /// Validate `action` and submit it once.
    ///
    /// Validation failures and [`DispatchError::Busy`] are returned before any
    /// network call. Once submitted, every result (including a revert or a
    /// rejected signature) is reported through [`PendingTransaction::outcome`].
    pub async fn dispatch<A: Action>(
        &self,
        action: A,
    ) -> Result<PendingTransaction, DispatchError> {
        action.validate()?;

        let description = action.description();
        let call = action.into_call();
        let slot = self.claim(A::KIND, call.clone(), description)?;

        debug!(action = %A::KIND, "Submitting transaction");

        let outcome = match self.client.submit(call).await {
            Ok(receipt) => {
                info!(
                    action = %A::KIND,
                    tx_hash = %receipt.tx_hash,
                    block_number = receipt.block_number,
                    "Action succeeded"
                );
                Outcome::Succeeded(receipt)
            }
            Err(e) => {
                warn!(action = %A::KIND, error = %e, "Action failed");
                Outcome::Failed(e.to_string())
            }
        };

        let succeeded = outcome.is_success();
        let record = slot.finish(outcome);
        if succeeded {
            self.refresh.notify_one();
        }

        Ok(record)
    }

    /// The most recent record for `kind`, in flight or finished.
    pub fn last(&self, kind: ActionKind) -> Option<PendingTransaction> {
        lock(&self.records).get(&kind).cloned()
    }

    /// Kinds with a transaction in flight.
    pub fn in_flight(&self) -> Vec<ActionKind> {
        let mut kinds: Vec<ActionKind> = lock(&self.records)
            .values()
            .filter(|record| record.outcome.is_in_flight())
            .map(|record| record.kind)
            .collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn is_busy(&self, kind: ActionKind) -> bool {
        lock(&self.records)
            .get(&kind)
            .is_some_and(|record| record.outcome.is_in_flight())
    }

    fn claim(
        &self,
        kind: ActionKind,
        params: WriteCall,
        description: String,
    ) -> Result<Slot<'_>, DispatchError> {
        let mut records = lock(&self.records);
        if records.get(&kind).is_some_and(|r| r.outcome.is_in_flight()) {
            debug!(action = %kind, "Rejected, already in flight");
            return Err(DispatchError::Busy(kind));
        }

        let record = PendingTransaction {
            kind,
            params,
            description,
            submitted_at: SystemTime::now(),
            outcome: Outcome::InFlight,
        };
        records.insert(kind, record.clone());

        Ok(Slot {
            records: &self.records,
            record,
            finished: false,
        })
    }
}

/// The in-flight record for one kind. Closed as [`Outcome::Abandoned`] if
/// dropped before [`Slot::finish`].
struct Slot<'a> {
    records: &'a Mutex<HashMap<ActionKind, PendingTransaction>>,
    record: PendingTransaction,
    finished: bool,
}

impl Slot<'_> {
    fn close(&mut self, outcome: Outcome) -> PendingTransaction {
        self.finished = true;
        self.record.outcome = outcome;
        lock(self.records).insert(self.record.kind, self.record.clone());
        self.record.clone()
    }

    fn finish(mut self, outcome: Outcome) -> PendingTransaction {
        self.close(outcome)
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                action = %self.record.kind,
                "Dispatch dropped while in flight, transaction may still be mined"
            );
            self.close(Outcome::Abandoned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Airdrop, Mint, SetTax};
    use alloy_primitives::{Address, U256};
    use client::mock::MockContract;
    use config::UnitConvention;
    use std::time::Duration;
    use tokio::time::timeout;
    use validation::Amount;

    const OWNER: Address = Address::repeat_byte(0x11);

    fn setup() -> (Arc<MockContract>, Arc<Notify>, Dispatcher<MockContract>) {
        let mock = Arc::new(MockContract::new(OWNER));
        let refresh = Arc::new(Notify::new());
        let dispatcher = Dispatcher::new(mock.clone(), refresh.clone());
        (mock, refresh, dispatcher)
    }

    fn set_tax(value: &str) -> SetTax {
        SetTax::parse(value, &UnitConvention::standard()).unwrap()
    }

    #[tokio::test]
    async fn test_set_tax_succeeds_and_requests_refresh() {
        let (mock, refresh, dispatcher) = setup();

        let record = dispatcher.dispatch(set_tax("5")).await.unwrap();

        assert_eq!(record.kind, ActionKind::SetTax);
        assert_eq!(
            record.params,
            WriteCall::SetTax {
                value: U256::from(5)
            }
        );
        assert!(record.outcome.is_success());
        assert_eq!(dispatcher.last(ActionKind::SetTax), Some(record));
        assert_eq!(mock.state().tax, U256::from(5));

        timeout(Duration::from_secs(1), refresh.notified())
            .await
            .expect("refresh requested");
    }

    #[tokio::test]
    async fn test_same_kind_is_busy() {
        let (mock, _, dispatcher) = setup();
        mock.hold_submissions();

        let second = async {
            tokio::task::yield_now().await;
            assert_eq!(dispatcher.in_flight(), vec![ActionKind::SetTax]);
            let result = dispatcher.dispatch(set_tax("6")).await;
            mock.release_submissions();
            result
        };
        let (first, second) = tokio::join!(dispatcher.dispatch(set_tax("5")), second);

        assert_eq!(second, Err(DispatchError::Busy(ActionKind::SetTax)));
        assert!(first.unwrap().outcome.is_success());
        assert_eq!(mock.submissions().len(), 1);
        assert_eq!(mock.state().tax, U256::from(5));
        assert!(dispatcher.in_flight().is_empty());
    }

    #[tokio::test]
    async fn test_different_kinds_run_concurrently() {
        let (mock, _, dispatcher) = setup();
        mock.hold_submissions();

        let release = async {
            tokio::task::yield_now().await;
            assert_eq!(
                dispatcher.in_flight(),
                vec![ActionKind::Mint, ActionKind::SetTax]
            );
            mock.release_submissions();
        };
        let mint = Mint::parse("1", &UnitConvention::standard()).unwrap();
        let (tax, mint, _) = tokio::join!(
            dispatcher.dispatch(set_tax("5")),
            dispatcher.dispatch(mint),
            release
        );

        assert!(tax.unwrap().outcome.is_success());
        assert!(mint.unwrap().outcome.is_success());
        assert_eq!(mock.submissions().len(), 2);
    }

    #[tokio::test]
    async fn test_submission_failure_is_an_outcome() {
        let (mock, _, dispatcher) = setup();
        mock.fail_submissions("execution reverted: caller is not the owner");

        let record = dispatcher.dispatch(set_tax("5")).await.unwrap();

        assert!(
            matches!(&record.outcome, Outcome::Failed(reason) if reason.contains("not the owner"))
        );
        assert!(!dispatcher.is_busy(ActionKind::SetTax));

        // Retrying is up to the caller
        mock.restore_submissions();
        let record = dispatcher.dispatch(set_tax("5")).await.unwrap();
        assert!(record.outcome.is_success());
        assert_eq!(mock.submissions().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_parameters_never_submit() {
        let (mock, _, dispatcher) = setup();

        let airdrop = Airdrop {
            recipients: vec![],
            amount: Amount::from_base_units(U256::from(1), 18),
        };
        let result = dispatcher.dispatch(airdrop).await;

        assert!(matches!(
            result,
            Err(DispatchError::InvalidParameters {
                kind: ActionKind::Airdrop,
                ..
            })
        ));
        assert!(mock.submissions().is_empty());
        assert_eq!(dispatcher.last(ActionKind::Airdrop), None);
    }

    #[tokio::test]
    async fn test_dropped_dispatch_is_abandoned() {
        let (mock, _, dispatcher) = setup();
        mock.hold_submissions();

        let result = timeout(Duration::from_millis(20), dispatcher.dispatch(set_tax("5"))).await;
        assert!(result.is_err());

        let record = dispatcher.last(ActionKind::SetTax).unwrap();
        assert_eq!(record.outcome, Outcome::Abandoned);
        assert!(!record.outcome.is_success());
        assert!(!matches!(record.outcome, Outcome::Failed(_)));
        assert!(dispatcher.in_flight().is_empty());

        mock.release_submissions();
        let record = dispatcher.dispatch(set_tax("7")).await.unwrap();
        assert!(record.outcome.is_success());
    }
}

//! Wallet session: which account is active.
//!
//! [`Session`] holds at most one active account. Other components never copy
//! it: they keep a [`watch::Receiver`] from [`Session::subscribe`] and read the
//! current [`AccountState`] at the moment they need it.

pub mod wallet;

use alloy_primitives::Address;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
pub use wallet::{LocalWallet, RpcWallet, StaticAccount, WalletProvider};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),
}

/// The active account and the tenure it belongs to.
///
/// `epoch` increases on every change, including a reconnect of the same
/// address, so results fetched during an older tenure can be recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    pub account: Option<Address>,
    pub epoch: u64,
}

#[derive(Debug)]
pub struct Session {
    state: watch::Sender<AccountState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A disconnected session.
    pub fn new() -> Self {
        let (state, _) = watch::channel(AccountState::default());
        Self { state }
    }

    /// Ask `wallet` for its accounts and activate the first one.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn connect<W: WalletProvider>(&self, wallet: &W) -> Result<Address, SessionError> {
        let accounts = wallet.request_accounts().await.map_err(|e| {
            warn!(error = %e, "Wallet refused connection");
            SessionError::ConnectionFailed(e.to_string())
        })?;

        let Some(account) = accounts.first().copied() else {
            warn!("Wallet exposed no accounts");
            return Err(SessionError::ConnectionFailed(
                "wallet exposed no accounts".to_string(),
            ));
        };

        let epoch = self.activate(Some(account));
        info!(account = %account, epoch, "Wallet connected");
        Ok(account)
    }

    /// Clear the active account.
    pub fn disconnect(&self) {
        if self.account().is_some() {
            let epoch = self.activate(None);
            info!(epoch, "Wallet disconnected");
        }
    }

    /// Handle an account-change notification from the wallet.
    pub fn switch_account(&self, account: Address) {
        if self.account() != Some(account) {
            let epoch = self.activate(Some(account));
            info!(account = %account, epoch, "Active account changed");
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.state.borrow().account
    }

    pub fn current(&self) -> AccountState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    /// Change notifications; the receiver always reads the live value.
    pub fn subscribe(&self) -> watch::Receiver<AccountState> {
        self.state.subscribe()
    }

    fn activate(&self, account: Option<Address>) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            state.account = account;
            state.epoch += 1;
            epoch = state.epoch;
        });
        epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0xaa);
    const BOB: Address = Address::repeat_byte(0xbb);

    struct BrokenWallet;

    impl WalletProvider for BrokenWallet {
        async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
            eyre::bail!("user rejected the request")
        }
    }

    struct EmptyWallet;

    impl WalletProvider for EmptyWallet {
        async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let session = Session::new();
        assert!(!session.is_connected());

        let account = session.connect(&StaticAccount(ALICE)).await.unwrap();
        assert_eq!(account, ALICE);
        assert_eq!(session.current(), AccountState { account: Some(ALICE), epoch: 1 });

        session.disconnect();
        assert_eq!(session.current(), AccountState { account: None, epoch: 2 });

        // Nothing to clear
        session.disconnect();
        assert_eq!(session.current().epoch, 2);
    }

    #[tokio::test]
    async fn test_connect_failure_keeps_session() {
        let session = Session::new();

        let result = session.connect(&BrokenWallet).await;
        assert!(matches!(result, Err(SessionError::ConnectionFailed(e)) if e.contains("rejected")));
        assert_eq!(session.current(), AccountState::default());

        let result = session.connect(&EmptyWallet).await;
        assert!(result.is_err());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_switch_account_bumps_epoch() {
        let session = Session::new();
        session.connect(&StaticAccount(ALICE)).await.unwrap();

        session.switch_account(ALICE);
        assert_eq!(session.current().epoch, 1);

        session.switch_account(BOB);
        assert_eq!(session.current(), AccountState { account: Some(BOB), epoch: 2 });
    }

    #[tokio::test]
    async fn test_reconnect_same_account_is_new_tenure() {
        let session = Session::new();
        session.connect(&StaticAccount(ALICE)).await.unwrap();
        session.connect(&StaticAccount(ALICE)).await.unwrap();
        assert_eq!(session.current().epoch, 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = Session::new();
        let mut rx = session.subscribe();

        session.connect(&StaticAccount(ALICE)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().account, Some(ALICE));

        session.switch_account(BOB);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().account, Some(BOB));
    }
}

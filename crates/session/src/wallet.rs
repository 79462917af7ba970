//! Wallet providers a session can connect through.

use crate::SessionError;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_signer_local::PrivateKeySigner;
use std::future::Future;

/// Source of accounts for [`crate::Session::connect`].
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet exposes; the first one becomes active.
    fn request_accounts(&self) -> impl Future<Output = eyre::Result<Vec<Address>>> + Send;
}

/// A local private-key signer.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub const fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_private_key(private_key: &str) -> Result<Self, SessionError> {
        let signer = client::parse_private_key(private_key)
            .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(signer))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }
}

/// Accounts managed by the node behind the provider (`eth_accounts`).
#[derive(Debug, Clone)]
pub struct RpcWallet<P> {
    provider: P,
}

impl<P> RpcWallet<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> WalletProvider for RpcWallet<P>
where
    P: Provider + Clone,
{
    async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }
}

/// A fixed, watch-only account. Nothing can be signed with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAccount(pub Address);

impl WalletProvider for StaticAccount {
    async fn request_accounts(&self) -> eyre::Result<Vec<Address>> {
        Ok(vec![self.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[tokio::test]
    async fn test_local_wallet_exposes_signer_address() {
        // anvil account #1
        let wallet = LocalWallet::from_private_key(
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        )
        .unwrap();
        let expected = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

        assert_eq!(wallet.address(), expected);
        assert_eq!(wallet.request_accounts().await.unwrap(), vec![expected]);
    }

    #[test]
    fn test_local_wallet_bad_key() {
        let result = LocalWallet::from_private_key("not a key");
        assert!(matches!(result, Err(SessionError::ConnectionFailed(_))));
    }
}

//! Typed read/write interface to the pegged token contract.
//!
//! [`ContractClient`] is the only way the rest of the workspace reaches the
//! chain. [`TokenClient`] implements it on top of an alloy provider; tests use
//! [`crate::mock::MockContract`].

use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use binding::token::IPeggedToken;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future};
use tracing::{debug, info};

/// Named reads that make up a contract snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReadField {
    Rate,
    Tax,
    TaxReceiver,
    Owner,
    IsWhitelist,
    IsAdmin,
    NativeBalance,
    TokenBalance,
}

impl ReadField {
    pub const ALL: [Self; 8] = [
        Self::Rate,
        Self::Tax,
        Self::TaxReceiver,
        Self::Owner,
        Self::IsWhitelist,
        Self::IsAdmin,
        Self::NativeBalance,
        Self::TokenBalance,
    ];

    /// Reads parameterized by the connected account.
    pub const fn is_account_scoped(&self) -> bool {
        matches!(
            self,
            Self::IsWhitelist | Self::IsAdmin | Self::NativeBalance | Self::TokenBalance
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Tax => "tax",
            Self::TaxReceiver => "taxReceiver",
            Self::Owner => "owner",
            Self::IsWhitelist => "isWhitelist",
            Self::IsAdmin => "isAdmin",
            Self::NativeBalance => "nativeBalance",
            Self::TokenBalance => "tokenBalance",
        }
    }
}

impl fmt::Display for ReadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of state-mutating calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    Mint,
    Burn,
    Approve,
    Airdrop,
    SetWhitelist,
    SetAdmin,
    SetTax,
    SetTaxReceiver,
    SetRate,
    GetToken,
    GetEth,
}

impl ActionKind {
    pub const ALL: [Self; 11] = [
        Self::Mint,
        Self::Burn,
        Self::Approve,
        Self::Airdrop,
        Self::SetWhitelist,
        Self::SetAdmin,
        Self::SetTax,
        Self::SetTaxReceiver,
        Self::SetRate,
        Self::GetToken,
        Self::GetEth,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Approve => "approve",
            Self::Airdrop => "airdrop",
            Self::SetWhitelist => "setWhitelist",
            Self::SetAdmin => "setAdmin",
            Self::SetTax => "setTax",
            Self::SetTaxReceiver => "setTaxReceiver",
            Self::SetRate => "setRate",
            Self::GetToken => "getToken",
            Self::GetEth => "getEth",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formatted write call. Amounts are already in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteCall {
    Mint { amount: U256 },
    Burn { amount: U256 },
    Approve { spender: Address, amount: U256 },
    Airdrop { recipients: Vec<Address>, amount: U256 },
    SetWhitelist { account: Address, status: bool },
    SetAdmin { account: Address, status: bool },
    SetTax { value: U256 },
    SetTaxReceiver { receiver: Address },
    SetRate { rate: U256 },
    /// Payable: `value` is attached as native currency.
    GetToken { value: U256 },
    GetEth { amount: U256 },
}

impl WriteCall {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Mint { .. } => ActionKind::Mint,
            Self::Burn { .. } => ActionKind::Burn,
            Self::Approve { .. } => ActionKind::Approve,
            Self::Airdrop { .. } => ActionKind::Airdrop,
            Self::SetWhitelist { .. } => ActionKind::SetWhitelist,
            Self::SetAdmin { .. } => ActionKind::SetAdmin,
            Self::SetTax { .. } => ActionKind::SetTax,
            Self::SetTaxReceiver { .. } => ActionKind::SetTaxReceiver,
            Self::SetRate { .. } => ActionKind::SetRate,
            Self::GetToken { .. } => ActionKind::GetToken,
            Self::GetEth { .. } => ActionKind::GetEth,
        }
    }
}

/// Receipt of a mined write call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
}

/// Read and write access to the token contract.
pub trait ContractClient: Send + Sync {
    fn rate(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    fn tax(&self) -> impl Future<Output = eyre::Result<U256>> + Send;

    fn tax_receiver(&self) -> impl Future<Output = eyre::Result<Address>> + Send;

    fn owner(&self) -> impl Future<Output = eyre::Result<Address>> + Send;

    fn is_whitelist(&self, account: Address) -> impl Future<Output = eyre::Result<bool>> + Send;

    fn is_admin(&self, account: Address) -> impl Future<Output = eyre::Result<bool>> + Send;

    /// Native currency balance of `account`.
    fn native_balance(&self, account: Address)
        -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Token balance of `account`.
    fn token_balance(&self, account: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    fn decimals(&self) -> impl Future<Output = eyre::Result<u8>> + Send;

    /// Submit one write call and wait for it to be mined.
    ///
    /// Returns an error if the wallet rejects the transaction, the node
    /// refuses it, or it reverts.
    fn submit(&self, call: WriteCall) -> impl Future<Output = eyre::Result<TxReceipt>> + Send;
}

/// [`ContractClient`] backed by an alloy provider.
///
/// Writes are signed by whatever wallet the provider was built with.
#[derive(Debug, Clone)]
pub struct TokenClient<P> {
    provider: P,
    address: Address,
}

impl<P> TokenClient<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    pub const fn address(&self) -> Address {
        self.address
    }
}

impl<P> ContractClient for TokenClient<P>
where
    P: Provider + Clone,
{
    async fn rate(&self) -> eyre::Result<U256> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.rate().call().await?)
    }

    async fn tax(&self) -> eyre::Result<U256> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.tax().call().await?)
    }

    async fn tax_receiver(&self) -> eyre::Result<Address> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.taxReceiver().call().await?)
    }

    async fn owner(&self) -> eyre::Result<Address> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.owner().call().await?)
    }

    async fn is_whitelist(&self, account: Address) -> eyre::Result<bool> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.isWhitelist(account).call().await?)
    }

    async fn is_admin(&self, account: Address) -> eyre::Result<bool> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.isAdmin(account).call().await?)
    }

    async fn native_balance(&self, account: Address) -> eyre::Result<U256> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn token_balance(&self, account: Address) -> eyre::Result<U256> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.balanceOf(account).call().await?)
    }

    async fn decimals(&self) -> eyre::Result<u8> {
        let contract = IPeggedToken::new(self.address, &self.provider);
        Ok(contract.decimals().call().await?)
    }

    async fn submit(&self, call: WriteCall) -> eyre::Result<TxReceipt> {
        let kind = call.kind();
        let contract = IPeggedToken::new(self.address, &self.provider);

        debug!(action = %kind, contract = %self.address, "Sending transaction");

        let pending_tx = match call {
            WriteCall::Mint { amount } => contract.mint(amount).send().await?,
            WriteCall::Burn { amount } => contract.burn(amount).send().await?,
            WriteCall::Approve { spender, amount } => {
                contract.approve(spender, amount).send().await?
            }
            WriteCall::Airdrop { recipients, amount } => {
                contract.airdrop(recipients, amount).send().await?
            }
            WriteCall::SetWhitelist { account, status } => {
                contract.setWhiteList(account, status).send().await?
            }
            WriteCall::SetAdmin { account, status } => {
                contract.setAdmin(account, status).send().await?
            }
            WriteCall::SetTax { value } => contract.setTax(value).send().await?,
            WriteCall::SetTaxReceiver { receiver } => {
                contract.setTaxReceiver(receiver).send().await?
            }
            WriteCall::SetRate { rate } => contract.setRate(rate).send().await?,
            WriteCall::GetToken { value } => contract.getToken().value(value).send().await?,
            WriteCall::GetEth { amount } => contract.getEth(amount).send().await?,
        };

        let tx_hash = *pending_tx.tx_hash();

        // Wait for confirmation
        let receipt = pending_tx.get_receipt().await?;

        if !receipt.status() {
            eyre::bail!("Transaction {tx_hash} reverted");
        }

        info!(
            action = %kind,
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction mined"
        );

        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}

//! Fixed function table for [`IPeggedToken`](crate::token::IPeggedToken).
//!
//! The table is derived from the `sol!` bindings at compile time. At startup it
//! can be checked against a compiled contract artifact so a deployment whose
//! interface drifted from the bindings is rejected before any call is made.

use crate::token::IPeggedToken;
use alloy_sol_types::SolCall;
use serde::Deserialize;
use thiserror::Error;

/// State mutability of a contract function, as far as the controller cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// `view` or `pure`; called with `eth_call`.
    View,
    /// State-changing, no value attached.
    NonPayable,
    /// State-changing, accepts native value.
    Payable,
}

impl Mutability {
    fn from_abi(value: &str) -> Option<Self> {
        match value {
            "view" | "pure" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }
}

/// One entry of the function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    /// Canonical signature, e.g. `airdrop(address[],uint256)`.
    pub signature: &'static str,
    pub selector: [u8; 4],
    pub mutability: Mutability,
}

const fn spec<C: SolCall>(name: &'static str, mutability: Mutability) -> FunctionSpec {
    FunctionSpec {
        name,
        signature: C::SIGNATURE,
        selector: C::SELECTOR,
        mutability,
    }
}

/// Every function the controller reads or writes.
pub const FUNCTIONS: &[FunctionSpec] = &[
    spec::<IPeggedToken::rateCall>("rate", Mutability::View),
    spec::<IPeggedToken::taxCall>("tax", Mutability::View),
    spec::<IPeggedToken::taxReceiverCall>("taxReceiver", Mutability::View),
    spec::<IPeggedToken::ownerCall>("owner", Mutability::View),
    spec::<IPeggedToken::isWhitelistCall>("isWhitelist", Mutability::View),
    spec::<IPeggedToken::isAdminCall>("isAdmin", Mutability::View),
    spec::<IPeggedToken::balanceOfCall>("balanceOf", Mutability::View),
    spec::<IPeggedToken::decimalsCall>("decimals", Mutability::View),
    spec::<IPeggedToken::mintCall>("mint", Mutability::NonPayable),
    spec::<IPeggedToken::burnCall>("burn", Mutability::NonPayable),
    spec::<IPeggedToken::approveCall>("approve", Mutability::NonPayable),
    spec::<IPeggedToken::airdropCall>("airdrop", Mutability::NonPayable),
    spec::<IPeggedToken::setWhiteListCall>("setWhiteList", Mutability::NonPayable),
    spec::<IPeggedToken::setAdminCall>("setAdmin", Mutability::NonPayable),
    spec::<IPeggedToken::setTaxCall>("setTax", Mutability::NonPayable),
    spec::<IPeggedToken::setTaxReceiverCall>("setTaxReceiver", Mutability::NonPayable),
    spec::<IPeggedToken::setRateCall>("setRate", Mutability::NonPayable),
    spec::<IPeggedToken::getTokenCall>("getToken", Mutability::Payable),
    spec::<IPeggedToken::getEthCall>("getEth", Mutability::NonPayable),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AbiError {
    #[error("Malformed contract artifact: {0}")]
    Malformed(String),

    #[error("Contract artifact has no function {0}")]
    MissingFunction(&'static str),

    #[error("Function {signature} is {found:?} in the artifact, expected {expected:?}")]
    MutabilityMismatch {
        signature: &'static str,
        expected: Mutability,
        found: Mutability,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Artifact {
    /// Hardhat / Foundry output: `{ "abi": [...], ... }`
    Compiled { abi: Vec<AbiItem> },
    /// A bare ABI array.
    Bare(Vec<AbiItem>),
}

#[derive(Deserialize)]
struct AbiItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    state_mutability: Option<String>,
    /// Pre-0.5 artifacts only carry these flags.
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

#[derive(Deserialize)]
struct AbiParam {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

impl AbiParam {
    /// Canonical type, expanding tuples into `(a,b)` form.
    fn canonical(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) => {
                let inner: Vec<String> = self.components.iter().map(Self::canonical).collect();
                format!("({}){}", inner.join(","), suffix)
            }
            None => self.ty.clone(),
        }
    }
}

impl AbiItem {
    fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(AbiParam::canonical).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    fn mutability(&self) -> Mutability {
        if let Some(m) = self.state_mutability.as_deref().and_then(Mutability::from_abi) {
            return m;
        }
        match (self.constant, self.payable) {
            (Some(true), _) => Mutability::View,
            (_, Some(true)) => Mutability::Payable,
            _ => Mutability::NonPayable,
        }
    }
}

/// The function table, checked against a deployment artifact.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable {
    functions: &'static [FunctionSpec],
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionTable {
    pub const fn new() -> Self {
        Self {
            functions: FUNCTIONS,
        }
    }

    /// Parse an artifact and check every table entry against it.
    pub fn load(artifact_json: &str) -> Result<Self, AbiError> {
        let table = Self::new();
        table.verify(artifact_json)?;
        Ok(table)
    }

    /// Check that the artifact declares every function of the table with the
    /// same mutability. Extra functions in the artifact are ignored.
    pub fn verify(&self, artifact_json: &str) -> Result<(), AbiError> {
        let artifact: Artifact = serde_json::from_str(artifact_json)
            .map_err(|e| AbiError::Malformed(e.to_string()))?;
        let items = match artifact {
            Artifact::Compiled { abi } => abi,
            Artifact::Bare(items) => items,
        };

        let declared: Vec<(String, Mutability)> = items
            .iter()
            .filter(|item| item.kind == "function")
            .map(|item| (item.signature(), item.mutability()))
            .collect();

        for function in self.functions {
            let Some((_, found)) = declared
                .iter()
                .find(|(signature, _)| signature == function.signature)
            else {
                return Err(AbiError::MissingFunction(function.signature));
            };

            if *found != function.mutability {
                return Err(AbiError::MutabilityMismatch {
                    signature: function.signature,
                    expected: function.mutability,
                    found: *found,
                });
            }
        }

        Ok(())
    }

    pub fn functions(&self) -> &'static [FunctionSpec] {
        self.functions
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<&'static FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }
}

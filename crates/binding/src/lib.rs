//! Contract bindings for the pegged token.
//!
//! This crate holds the Solidity interface the controller talks to and the
//! fixed function table derived from it:
//! - `token`: the `IPeggedToken` interface (reads, owner/admin writes, swaps)
//! - `abi`: canonical signatures and selectors, checked against a compiled
//!   artifact at startup
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod abi;
pub mod token;

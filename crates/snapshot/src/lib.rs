//! Read-state aggregation and role resolution.
//!
//! - `snapshot`: the field-level view of the contract ([`ContractSnapshot`])
//! - `aggregator`: issues the read set and keeps the snapshot current
//!   ([`ReadAggregator`])
//! - `role`: derives the caller's [`Role`] from a snapshot

pub mod aggregator;
pub mod role;
pub mod snapshot;

pub use aggregator::{ReadAggregator, RetryPolicy};
pub use role::{required_role, resolve, Role};
pub use snapshot::{ContractSnapshot, FieldState, Freshness, ReadOutcome, ReadValue};

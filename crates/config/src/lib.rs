//! Configuration types for the token controller.
//!
//! This crate provides:
//! - Unit conventions (how human amounts scale into contract base units)
//! - The token contract configuration and its builder

pub mod contract;
pub mod units;

pub use contract::{ConfigError, ContractConfig, ContractConfigBuilder};
pub use units::UnitConvention;

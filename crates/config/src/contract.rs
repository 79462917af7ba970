//! Token contract configuration.

use crate::units::UnitConvention;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Token address must not be zero")]
    ZeroTokenAddress,

    #[error("Decimals too large for a 256-bit amount: {0}")]
    DecimalsTooLarge(String),
}

/// Everything the controller needs to know about the deployed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Token contract address
    pub token: Address,
    /// How human amounts scale into base units
    #[serde(default)]
    pub units: UnitConvention,
}

impl ContractConfig {
    pub const fn new(token: Address) -> Self {
        Self {
            token,
            units: UnitConvention::standard(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token == Address::ZERO {
            return Err(ConfigError::ZeroTokenAddress);
        }

        let oversized = self.units.oversized_fields();
        if !oversized.is_empty() {
            return Err(ConfigError::DecimalsTooLarge(oversized.join(", ")));
        }

        Ok(())
    }
}

/// Builder for non-standard unit conventions.
#[derive(Debug, Clone)]
pub struct ContractConfigBuilder {
    token: Address,
    units: UnitConvention,
}

impl ContractConfigBuilder {
    /// Start with standard units.
    pub const fn new(token: Address) -> Self {
        Self {
            token,
            units: UnitConvention::standard(),
        }
    }

    /// Override token decimals.
    pub const fn token_decimals(mut self, decimals: u8) -> Self {
        self.units.token_decimals = decimals;
        self
    }

    /// Override native currency decimals.
    pub const fn native_decimals(mut self, decimals: u8) -> Self {
        self.units.native_decimals = decimals;
        self
    }

    /// Override rate decimals.
    pub const fn rate_decimals(mut self, decimals: u8) -> Self {
        self.units.rate_decimals = decimals;
        self
    }

    /// Override tax decimals and the tax ceiling.
    pub const fn tax(mut self, decimals: u8, max_tax: u64) -> Self {
        self.units.tax_decimals = decimals;
        self.units.max_tax = max_tax;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ContractConfig, ConfigError> {
        let config = ContractConfig {
            token: self.token,
            units: self.units,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const TOKEN: Address = address!("0x1111111111111111111111111111111111111111");

    #[test]
    fn test_default_config() {
        let config = ContractConfig::new(TOKEN);
        assert_eq!(config.units, UnitConvention::standard());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config_builder() {
        let config = ContractConfigBuilder::new(TOKEN)
            .token_decimals(6)
            .tax(2, 25)
            .build()
            .unwrap();

        assert_eq!(config.token, TOKEN);
        assert_eq!(config.units.token_decimals, 6);
        assert_eq!(config.units.tax_decimals, 2);
        assert_eq!(config.units.max_tax, 25);
        assert_eq!(config.units.native_decimals, 18);
    }

    #[test]
    fn test_zero_token_rejected() {
        let result = ContractConfigBuilder::new(Address::ZERO).build();
        assert_eq!(result.unwrap_err(), ConfigError::ZeroTokenAddress);
    }

    #[test]
    fn test_oversized_decimals_rejected() {
        let result = ContractConfigBuilder::new(TOKEN).native_decimals(80).build();
        assert!(matches!(result, Err(ConfigError::DecimalsTooLarge(f)) if f == "native_decimals"));
    }

    #[test]
    fn test_deserialize_without_units() {
        let config: ContractConfig =
            toml::from_str(r#"token = "0x1111111111111111111111111111111111111111""#).unwrap();
        assert_eq!(config.token, TOKEN);
        assert_eq!(config.units, UnitConvention::standard());
    }
}

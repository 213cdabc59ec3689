//! Configuration for the value engine

use crate::{Error, Result};
use liquidity::PoolDefaults;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use staking::StakingConfig;
use std::str::FromStr;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Stake pricing
    pub staking: StakingConfig,

    /// Pool parameters supplied by the engine
    pub pools: PoolDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "esg-value-engine".to_string(),
            staking: StakingConfig::default(),
            pools: PoolDefaults::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("ESG_SERVICE_NAME") {
            config.service_name = name;
        }
        if let Some(apy) = env_decimal("ESG_STAKING_BASE_APY")? {
            config.staking.base_apy = apy;
        }
        if let Some(max) = env_decimal("ESG_STAKING_BONUS_MAX")? {
            config.staking.esg_bonus_max = max;
        }
        if let Some(rate) = env_decimal("ESG_POOL_FEE_RATE")? {
            config.pools.fee_rate = rate;
        }
        if let Some(apy) = env_decimal("ESG_POOL_BASE_APY")? {
            config.pools.base_apy = apy;
        }
        if let Some(apy) = env_decimal("ESG_POOL_BONUS_APY")? {
            config.pools.esg_bonus_apy = apy;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.staking.validate()?;
        self.pools.validate()?;
        Ok(())
    }
}

fn env_decimal(key: &str) -> Result<Option<Decimal>> {
    match std::env::var(key) {
        Ok(raw) => Decimal::from_str(raw.trim())
            .map(Some)
            .map_err(|e| Error::Config(format!("{} is not a decimal ({}): {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "esg-value-engine");
        assert_eq!(config.staking.base_apy, dec!(8));
        assert_eq!(config.pools.fee_rate, dec!(0.003));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
service_name = "esg-test"

[staking]
base_apy = "6.5"

[pools]
fee_rate = "0.01"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.service_name, "esg-test");
        assert_eq!(config.staking.base_apy, dec!(6.5));
        assert_eq!(config.staking.esg_bonus_max, dec!(7));
        assert_eq!(config.pools.fee_rate, dec!(0.01));
        assert_eq!(config.pools.base_apy, dec!(20));
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pools]\nfee_rate = \"2\"").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Liquidity(liquidity::Error::Config(_)))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            Config::from_file("/nonexistent/esg-engine.toml"),
            Err(Error::Io(_))
        ));
    }
}

//! Configuration for the stake ledger

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Stake pricing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// APY every stake earns, in percent
    pub base_apy: Decimal,

    /// APY added at score 100, in percent (linear in score)
    pub esg_bonus_max: Decimal,

    /// Day count used to prorate annual yield
    pub days_per_year: u32,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            base_apy: dec!(8.0),
            esg_bonus_max: dec!(7.0),
            days_per_year: 365,
        }
    }
}

impl StakingConfig {
    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.base_apy < Decimal::ZERO || self.esg_bonus_max < Decimal::ZERO {
            return Err(crate::Error::Config(
                "APY parameters must be non-negative".to_string(),
            ));
        }
        if self.days_per_year == 0 {
            return Err(crate::Error::Config(
                "days_per_year must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StakingConfig::default();
        assert_eq!(config.base_apy, dec!(8));
        assert_eq!(config.esg_bonus_max, dec!(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_day_count() {
        let config = StakingConfig {
            days_per_year: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

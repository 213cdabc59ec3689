//! Configuration for liquidity pools

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Engine-supplied pool parameters
///
/// APYs are never taken from the pool creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolDefaults {
    /// Swap fee rate applied when the creator supplies none (0.3%)
    pub fee_rate: Decimal,

    /// Base APY in percent
    pub base_apy: Decimal,

    /// ESG bonus APY in percent
    pub esg_bonus_apy: Decimal,

    /// Maximum harvest uplift at holder score 100 (0.2 = 20%)
    pub harvest_bonus_cap: Decimal,

    /// Day count used to prorate annual yield
    pub days_per_year: u32,
}

impl Default for PoolDefaults {
    fn default() -> Self {
        Self {
            fee_rate: dec!(0.003),
            base_apy: dec!(20),
            esg_bonus_apy: dec!(10),
            harvest_bonus_cap: dec!(0.2),
            days_per_year: 365,
        }
    }
}

impl PoolDefaults {
    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.fee_rate < Decimal::ZERO || self.fee_rate > Decimal::ONE {
            return Err(crate::Error::Config(format!(
                "fee_rate must be within [0, 1], got {}",
                self.fee_rate
            )));
        }
        if self.base_apy < Decimal::ZERO || self.esg_bonus_apy < Decimal::ZERO {
            return Err(crate::Error::Config(
                "APY parameters must be non-negative".to_string(),
            ));
        }
        if self.harvest_bonus_cap < Decimal::ZERO {
            return Err(crate::Error::Config(
                "harvest_bonus_cap must be non-negative".to_string(),
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
        let defaults = PoolDefaults::default();
        assert_eq!(defaults.fee_rate, dec!(0.003));
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn test_fee_rate_bounds() {
        let defaults = PoolDefaults {
            fee_rate: dec!(1.5),
            ..Default::default()
        };
        assert!(defaults.validate().is_err());
    }
}

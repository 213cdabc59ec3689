//! Core types for the stake ledger

use crate::{Error, Result, StakingConfig};
use chrono::{DateTime, Duration, Utc};
use esg_core::{AssetId, EsgScore, StakeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stake status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum StakeStatus {
    /// Principal locked, duration not yet elapsed
    Active = 1,
    /// Duration elapsed, awaiting settlement
    Matured = 2,
    /// Reward released (terminal)
    Withdrawn = 3,
}

/// Yield terms fixed at open time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeTerms {
    /// Total APY in percent
    pub apy: Decimal,

    /// ESG share of the APY in percent
    pub esg_bonus_apy: Decimal,

    /// Reward released at settlement
    pub expected_reward: Decimal,
}

/// Price a stake
///
/// Rejects non-positive principal or duration before anything is computed.
pub fn stake_terms(
    config: &StakingConfig,
    esg_score: EsgScore,
    principal: Decimal,
    duration_days: u32,
) -> Result<StakeTerms> {
    if principal <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "Principal must be positive, got {}",
            principal
        )));
    }
    if duration_days == 0 {
        return Err(Error::InvalidInput(
            "Duration must be at least one day".to_string(),
        ));
    }

    let overflow = || {
        Error::InvalidInput(format!(
            "Stake of {} over {} days overflows the yield calculation",
            principal, duration_days
        ))
    };

    let esg_bonus_apy = esg_score
        .fraction()
        .checked_mul(config.esg_bonus_max)
        .ok_or_else(overflow)?;
    let apy = config
        .base_apy
        .checked_add(esg_bonus_apy)
        .ok_or_else(overflow)?;
    let expected_reward = principal
        .checked_mul(apy)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|v| v.checked_mul(Decimal::from(duration_days)))
        .and_then(|v| v.checked_div(Decimal::from(config.days_per_year)))
        .ok_or_else(overflow)?;

    Ok(StakeTerms {
        apy,
        esg_bonus_apy,
        expected_reward,
    })
}

/// Locked stake against an ESG asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Stake ID
    pub stake_id: StakeId,

    /// Asset the stake was opened against
    pub asset_id: AssetId,

    /// Principal locked
    pub principal: Decimal,

    /// Lock duration in days
    pub duration_days: u32,

    /// Terms fixed at open time
    pub terms: StakeTerms,

    /// Accrual start
    pub opened_at: DateTime<Utc>,

    /// `opened_at + duration_days`
    pub matures_at: DateTime<Utc>,

    /// Current status
    pub status: StakeStatus,

    /// Settlement timestamp
    pub settled_at: Option<DateTime<Utc>>,
}

impl StakePosition {
    /// Create an active position
    ///
    /// Rejects durations whose maturity date falls outside the calendar.
    pub fn open(
        stake_id: StakeId,
        asset_id: AssetId,
        principal: Decimal,
        duration_days: u32,
        terms: StakeTerms,
        opened_at: DateTime<Utc>,
    ) -> Result<Self> {
        let matures_at = Duration::try_days(i64::from(duration_days))
            .and_then(|lock| opened_at.checked_add_signed(lock))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Duration of {} days matures past the supported calendar",
                    duration_days
                ))
            })?;

        Ok(Self {
            stake_id,
            asset_id,
            principal,
            duration_days,
            terms,
            opened_at,
            matures_at,
            status: StakeStatus::Active,
            settled_at: None,
        })
    }

    /// Whether the lock duration has elapsed at `now`
    pub fn is_mature_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.matures_at
    }

    /// Check if position is in terminal state
    pub fn is_terminal(&self) -> bool {
        self.status == StakeStatus::Withdrawn
    }
}

/// Result of settling a stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSettlement {
    /// Stake ID
    pub stake_id: StakeId,

    /// Asset the stake was opened against
    pub asset_id: AssetId,

    /// Principal released
    pub principal: Decimal,

    /// Reward released (the amount priced at open time)
    pub reward: Decimal,

    /// Settlement timestamp
    pub settled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_terms_for_score_74() {
        let config = StakingConfig::default();
        let terms = stake_terms(&config, EsgScore::new(dec!(74)), dec!(1000), 365).unwrap();
        assert_eq!(terms.esg_bonus_apy, dec!(5.18));
        assert_eq!(terms.apy, dec!(13.18));
        assert_eq!(terms.expected_reward, dec!(131.8));
    }

    #[test]
    fn test_bonus_capped_at_score_100() {
        let config = StakingConfig::default();
        let terms = stake_terms(&config, EsgScore::MAX, dec!(100), 30).unwrap();
        assert_eq!(terms.apy, dec!(15));
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let config = StakingConfig::default();
        let score = EsgScore::new(dec!(60));
        assert!(matches!(
            stake_terms(&config, score, dec!(0), 30),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            stake_terms(&config, score, dec!(-5), 30),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            stake_terms(&config, score, dec!(10), 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_principal_rejected_not_panicking() {
        let config = StakingConfig::default();
        let huge = Decimal::MAX / dec!(2);
        assert!(matches!(
            stake_terms(&config, EsgScore::MAX, huge, 30),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_maturity_past_calendar_rejected() {
        use chrono::TimeZone;
        use esg_core::{IdGenerator, SequentialIds};

        let ids = SequentialIds::new();
        let config = StakingConfig::default();
        let terms = stake_terms(&config, EsgScore::MAX, dec!(100), u32::MAX).unwrap();
        let opened_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = StakePosition::open(
            StakeId::from_uuid(ids.next_id()),
            AssetId::from_uuid(ids.next_id()),
            dec!(100),
            u32::MAX,
            terms,
            opened_at,
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}

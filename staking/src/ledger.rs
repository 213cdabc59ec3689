//! Stake ledger
//!
//! Owns every stake position. Positions sit in a `DashMap`; settlement flips
//! Active/Matured → Withdrawn while holding the entry's write guard, so two
//! concurrent settlements of the same stake cannot both pay out.

use crate::{
    types::{stake_terms, StakePosition, StakeSettlement, StakeStatus},
    Error, Result, StakingConfig,
};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use esg_core::{AssetId, EsgScore, StakeId};
use rust_decimal::Decimal;

/// Stake ledger
#[derive(Debug)]
pub struct StakeLedger {
    config: StakingConfig,
    positions: DashMap<StakeId, StakePosition>,
}

impl StakeLedger {
    /// Create new ledger
    pub fn new(config: StakingConfig) -> Self {
        Self {
            config,
            positions: DashMap::new(),
        }
    }

    /// Pricing configuration
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Open a stake against an asset with the given score
    ///
    /// A stake id already present in the ledger is rejected.
    pub fn open_stake(
        &self,
        stake_id: StakeId,
        asset_id: AssetId,
        esg_score: EsgScore,
        principal: Decimal,
        duration_days: u32,
        now: DateTime<Utc>,
    ) -> Result<StakePosition> {
        let terms = stake_terms(&self.config, esg_score, principal, duration_days)?;
        let position =
            StakePosition::open(stake_id, asset_id, principal, duration_days, terms, now)?;

        match self.positions.entry(stake_id) {
            Entry::Occupied(_) => {
                return Err(Error::InvalidInput(format!("Stake {} already exists", stake_id)));
            }
            Entry::Vacant(slot) => {
                slot.insert(position.clone());
            }
        }

        tracing::info!(
            stake = %stake_id,
            asset = %asset_id,
            %principal,
            duration_days,
            apy = %terms.apy,
            expected_reward = %terms.expected_reward,
            "Opened stake"
        );

        Ok(position)
    }

    /// Release the precomputed reward and close the position
    ///
    /// Allowed from Active or Matured. A second call returns
    /// `AlreadySettled` and pays nothing.
    pub fn mature_and_settle(
        &self,
        stake_id: StakeId,
        now: DateTime<Utc>,
    ) -> Result<StakeSettlement> {
        let mut entry = self
            .positions
            .get_mut(&stake_id)
            .ok_or(Error::StakeNotFound(stake_id))?;
        let position = entry.value_mut();

        if position.is_terminal() {
            return Err(Error::AlreadySettled(stake_id));
        }

        position.status = StakeStatus::Withdrawn;
        position.settled_at = Some(now);

        tracing::info!(
            stake = %stake_id,
            reward = %position.terms.expected_reward,
            "Settled stake"
        );

        Ok(StakeSettlement {
            stake_id,
            asset_id: position.asset_id,
            principal: position.principal,
            reward: position.terms.expected_reward,
            settled_at: now,
        })
    }

    /// Move every active position whose duration has elapsed to Matured
    ///
    /// Returns the number of positions that changed.
    pub fn refresh_maturity(&self, now: DateTime<Utc>) -> usize {
        let mut matured = 0;
        for mut entry in self.positions.iter_mut() {
            let position = entry.value_mut();
            if position.status == StakeStatus::Active && position.is_mature_at(now) {
                position.status = StakeStatus::Matured;
                matured += 1;
            }
        }
        if matured > 0 {
            tracing::debug!(matured, "Stakes matured");
        }
        matured
    }

    /// Get position snapshot
    pub fn get(&self, stake_id: StakeId) -> Result<StakePosition> {
        self.positions
            .get(&stake_id)
            .map(|p| p.value().clone())
            .ok_or(Error::StakeNotFound(stake_id))
    }

    /// All positions opened against an asset
    pub fn positions_for_asset(&self, asset_id: AssetId) -> Vec<StakePosition> {
        let mut positions: Vec<StakePosition> = self
            .positions
            .iter()
            .filter(|p| p.asset_id == asset_id)
            .map(|p| p.value().clone())
            .collect();
        positions.sort_by_key(|p| p.opened_at);
        positions
    }

    /// Principal still locked (Active or Matured)
    pub fn total_staked(&self) -> Decimal {
        self.positions
            .iter()
            .filter(|p| !p.is_terminal())
            .map(|p| p.principal)
            .sum()
    }

    /// Number of positions ever opened
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no position was ever opened
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for StakeLedger {
    fn default() -> Self {
        Self::new(StakingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use esg_core::{IdGenerator, SequentialIds};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn next_ids(gen: &SequentialIds) -> (StakeId, AssetId) {
        (
            StakeId::from_uuid(gen.next_id()),
            AssetId::from_uuid(gen.next_id()),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_open_then_settle_pays_expected_reward() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);

        let position = ledger
            .open_stake(stake_id, asset_id, EsgScore::new(dec!(74)), dec!(1000), 90, t0())
            .unwrap();
        assert_eq!(position.status, StakeStatus::Active);
        assert_eq!(position.matures_at, t0() + Duration::days(90));

        let settlement = ledger.mature_and_settle(stake_id, t0()).unwrap();
        let expected = dec!(1000) * dec!(13.18) / dec!(100) * dec!(90) / dec!(365);
        assert_eq!(settlement.reward, expected);
        assert_eq!(ledger.get(stake_id).unwrap().status, StakeStatus::Withdrawn);
    }

    #[test]
    fn test_double_settlement_rejected() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);
        ledger
            .open_stake(stake_id, asset_id, EsgScore::new(dec!(60)), dec!(500), 30, t0())
            .unwrap();

        ledger.mature_and_settle(stake_id, t0()).unwrap();
        assert_eq!(
            ledger.mature_and_settle(stake_id, t0()),
            Err(Error::AlreadySettled(stake_id))
        );
    }

    #[test]
    fn test_unknown_stake() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, _) = next_ids(&gen);
        assert_eq!(
            ledger.mature_and_settle(stake_id, t0()),
            Err(Error::StakeNotFound(stake_id))
        );
    }

    #[test]
    fn test_invalid_stake_leaves_ledger_untouched() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);
        let result = ledger.open_stake(stake_id, asset_id, EsgScore::MAX, dec!(0), 30, t0());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unrepresentable_maturity_rejected() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);
        let result =
            ledger.open_stake(stake_id, asset_id, EsgScore::MAX, dec!(100), u32::MAX, t0());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_duplicate_stake_id_rejected() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);
        let (_, other_asset) = next_ids(&gen);
        let original = ledger
            .open_stake(stake_id, asset_id, EsgScore::new(dec!(50)), dec!(100), 30, t0())
            .unwrap();

        let result = ledger.open_stake(stake_id, other_asset, EsgScore::MAX, dec!(9000), 365, t0());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(stake_id).unwrap(), original);
    }

    #[test]
    fn test_refresh_maturity() {
        let ledger = StakeLedger::default();
        let gen = SequentialIds::new();
        let (short, asset_id) = next_ids(&gen);
        let (long, _) = next_ids(&gen);
        ledger
            .open_stake(short, asset_id, EsgScore::MAX, dec!(100), 10, t0())
            .unwrap();
        ledger
            .open_stake(long, asset_id, EsgScore::MAX, dec!(100), 100, t0())
            .unwrap();

        assert_eq!(ledger.refresh_maturity(t0() + Duration::days(9)), 0);
        assert_eq!(ledger.refresh_maturity(t0() + Duration::days(10)), 1);
        assert_eq!(ledger.get(short).unwrap().status, StakeStatus::Matured);
        assert_eq!(ledger.get(long).unwrap().status, StakeStatus::Active);

        // Matured positions still settle at the price fixed at open
        let settlement = ledger.mature_and_settle(short, t0() + Duration::days(40)).unwrap();
        assert_eq!(settlement.reward, dec!(100) * dec!(15) / dec!(100) * dec!(10) / dec!(365));
        assert_eq!(ledger.total_staked(), dec!(100));
        assert_eq!(ledger.positions_for_asset(asset_id).len(), 2);
    }

    #[test]
    fn test_concurrent_settlement_pays_once() {
        let ledger = Arc::new(StakeLedger::default());
        let gen = SequentialIds::new();
        let (stake_id, asset_id) = next_ids(&gen);
        ledger
            .open_stake(stake_id, asset_id, EsgScore::MAX, dec!(1000), 365, t0())
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.mature_and_settle(stake_id, t0()).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }
}

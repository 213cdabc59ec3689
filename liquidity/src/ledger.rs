//! Liquidity ledger
//!
//! Registry of pool books. Each pool sits behind its own mutex so
//! operations on one pool are serialized while different pools proceed in
//! parallel. Map guards are never held while a pool lock is taken.

use crate::{
    config::PoolDefaults,
    pool::PoolBook,
    types::{
        HarvestReward, HolderSummary, LiquidityPool, LiquidityPosition, PoolAnalytics,
        PoolConfig, PoolStatus, PoolsSummary, Withdrawal,
    },
    Error, Result,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use esg_core::{EsgScore, HolderId, PoolId, PositionId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

type SharedBook = Arc<Mutex<PoolBook>>;

/// Liquidity ledger
#[derive(Debug)]
pub struct LiquidityLedger {
    defaults: PoolDefaults,
    pools: DashMap<PoolId, SharedBook>,
    /// Position → owning pool
    position_index: DashMap<PositionId, PoolId>,
    /// Holder → positions in opening order
    holder_index: DashMap<HolderId, Vec<PositionId>>,
}

impl LiquidityLedger {
    /// Create new ledger
    pub fn new(defaults: PoolDefaults) -> Self {
        Self {
            defaults,
            pools: DashMap::new(),
            position_index: DashMap::new(),
            holder_index: DashMap::new(),
        }
    }

    /// Engine pool parameters
    pub fn defaults(&self) -> &PoolDefaults {
        &self.defaults
    }

    /// Create a pool; APYs come from the engine defaults
    pub fn create_pool(
        &self,
        pool_id: PoolId,
        config: PoolConfig,
        now: DateTime<Utc>,
    ) -> Result<LiquidityPool> {
        if config.token_a.trim().is_empty() || config.token_b.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Token symbols must not be empty".to_string(),
            ));
        }
        let fee_rate = config.fee_rate.unwrap_or(self.defaults.fee_rate);
        if fee_rate < Decimal::ZERO || fee_rate > Decimal::ONE {
            return Err(Error::InvalidInput(format!(
                "Fee rate must be within [0, 1], got {}",
                fee_rate
            )));
        }
        if self.pools.contains_key(&pool_id) {
            return Err(Error::InvalidInput(format!("Pool {} already exists", pool_id)));
        }

        let pool = LiquidityPool {
            pool_id,
            pool_type: config.pool_type,
            token_a: config.token_a,
            token_b: config.token_b,
            fee_rate,
            base_apy: self.defaults.base_apy,
            esg_bonus_apy: self.defaults.esg_bonus_apy,
            total_apy: self.defaults.base_apy + self.defaults.esg_bonus_apy,
            total_liquidity: Decimal::ZERO,
            total_shares: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            fees_paid: Decimal::ZERO,
            fee_per_share: Decimal::ZERO,
            active_users: 0,
            status: PoolStatus::Active,
            created_at: now,
        };

        tracing::info!(
            pool = %pool_id,
            pool_type = %pool.pool_type,
            pair = %format!("{}/{}", pool.token_a, pool.token_b),
            %fee_rate,
            total_apy = %pool.total_apy,
            "Created pool"
        );

        let book = PoolBook::new(
            pool.clone(),
            self.defaults.harvest_bonus_cap,
            self.defaults.days_per_year,
        );
        self.pools.insert(pool_id, Arc::new(Mutex::new(book)));
        Ok(pool)
    }

    fn book(&self, pool_id: PoolId) -> Result<SharedBook> {
        self.pools
            .get(&pool_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::PoolNotFound(pool_id))
    }

    fn book_for_position(&self, position_id: PositionId) -> Result<SharedBook> {
        let pool_id = self
            .position_index
            .get(&position_id)
            .map(|entry| *entry.value())
            .ok_or(Error::PositionNotFound(position_id))?;
        self.book(pool_id)
    }

    /// Deposit both tokens into a pool
    pub fn add_liquidity(
        &self,
        pool_id: PoolId,
        position_id: PositionId,
        holder: HolderId,
        amount_a: Decimal,
        amount_b: Decimal,
        now: DateTime<Utc>,
    ) -> Result<LiquidityPosition> {
        let book = self.book(pool_id)?;
        let mut book = book.lock();

        let position = book.deposit(position_id, holder.clone(), amount_a, amount_b, now)?;
        self.position_index.insert(position_id, pool_id);
        self.holder_index.entry(holder).or_default().push(position_id);

        tracing::info!(
            pool = %pool_id,
            position = %position_id,
            holder = %position.holder,
            shares = %position.shares,
            share_percentage = %position.share_percentage,
            "Added liquidity"
        );

        Ok(position)
    }

    /// Redeem shares from a position
    pub fn remove_liquidity(
        &self,
        position_id: PositionId,
        shares_to_remove: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Withdrawal> {
        let book = self.book_for_position(position_id)?;
        let withdrawal = book.lock().withdraw(position_id, shares_to_remove, now)?;

        tracing::info!(
            pool = %withdrawal.pool_id,
            position = %position_id,
            shares = %withdrawal.shares_removed,
            fees = %withdrawal.fees_earned,
            total = %withdrawal.total_withdrawal,
            "Removed liquidity"
        );

        Ok(withdrawal)
    }

    /// Pay the yield-farming reward accrued since the last harvest
    pub fn harvest(
        &self,
        position_id: PositionId,
        holder_esg_score: EsgScore,
        now: DateTime<Utc>,
    ) -> Result<HarvestReward> {
        let book = self.book_for_position(position_id)?;
        let reward = book.lock().harvest(position_id, holder_esg_score, now)?;

        tracing::info!(
            position = %position_id,
            days = reward.days_elapsed,
            total_reward = %reward.total_reward,
            "Harvested rewards"
        );

        Ok(reward)
    }

    /// Accrue swap fees on a pool; returns the fee taken
    pub fn accrue_fees(&self, pool_id: PoolId, volume: Decimal) -> Result<Decimal> {
        let fee = self.book(pool_id)?.lock().accrue_fees(volume)?;
        tracing::debug!(pool = %pool_id, %volume, %fee, "Accrued fees");
        Ok(fee)
    }

    /// Close a pool to deposits
    pub fn deactivate_pool(&self, pool_id: PoolId) -> Result<()> {
        self.book(pool_id)?.lock().deactivate();
        tracing::warn!(pool = %pool_id, "Pool deactivated");
        Ok(())
    }

    /// Pool snapshot
    pub fn get_pool(&self, pool_id: PoolId) -> Result<LiquidityPool> {
        Ok(self.book(pool_id)?.lock().pool().clone())
    }

    /// Position snapshot
    pub fn get_position(&self, position_id: PositionId) -> Result<LiquidityPosition> {
        let book = self.book_for_position(position_id)?;
        let book = book.lock();
        book.position(position_id)
            .cloned()
            .ok_or(Error::PositionNotFound(position_id))
    }

    /// Consistent pool snapshot
    pub fn pool_analytics(&self, pool_id: PoolId) -> Result<PoolAnalytics> {
        Ok(self.book(pool_id)?.lock().analytics())
    }

    /// Every position a holder opened, with totals over the active ones
    pub fn holder_summary(&self, holder: &HolderId, now: DateTime<Utc>) -> HolderSummary {
        let position_ids = self
            .holder_index
            .get(holder)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let mut positions = Vec::with_capacity(position_ids.len());
        let mut total_value = Decimal::ZERO;
        let mut pending_rewards = Decimal::ZERO;

        for position_id in position_ids {
            let Ok(book) = self.book_for_position(position_id) else {
                continue;
            };
            let book = book.lock();
            let Some(position) = book.position(position_id) else {
                continue;
            };
            if position.is_active() {
                total_value += position.value();
                pending_rewards += book.pending_reward(position, now);
            }
            positions.push(position.clone());
        }

        HolderSummary {
            holder: holder.clone(),
            total_positions: positions.iter().filter(|p| p.is_active()).count(),
            total_value,
            pending_rewards,
            positions,
        }
    }

    /// Aggregate over all pools
    pub fn all_pools_summary(&self) -> PoolsSummary {
        let books: Vec<SharedBook> = self
            .pools
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut summary = PoolsSummary {
            total_pools: books.len(),
            total_liquidity: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            total_users: 0,
        };
        for book in books {
            let book = book.lock();
            let pool = book.pool();
            summary.total_liquidity += pool.total_liquidity;
            summary.total_fees += pool.total_fees;
            summary.total_users += pool.active_users;
        }
        summary
    }

    /// Number of pools
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl Default for LiquidityLedger {
    fn default() -> Self {
        Self::new(PoolDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use esg_core::{IdGenerator, SequentialIds};
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn setup() -> (LiquidityLedger, SequentialIds, PoolId) {
        let ledger = LiquidityLedger::default();
        let ids = SequentialIds::new();
        let pool_id = PoolId::from_uuid(ids.next_id());
        ledger.create_pool(pool_id, PoolConfig::default(), t0()).unwrap();
        (ledger, ids, pool_id)
    }

    #[test]
    fn test_pool_gets_engine_apys() {
        let (ledger, _, pool_id) = setup();
        let pool = ledger.get_pool(pool_id).unwrap();
        assert_eq!(pool.base_apy, dec!(20));
        assert_eq!(pool.esg_bonus_apy, dec!(10));
        assert_eq!(pool.total_apy, dec!(30));
        assert_eq!(pool.fee_rate, dec!(0.003));
        assert_eq!(pool.status, PoolStatus::Active);
    }

    #[test]
    fn test_create_pool_validation() {
        let ledger = LiquidityLedger::default();
        let ids = SequentialIds::new();

        let bad_fee = PoolConfig {
            fee_rate: Some(dec!(1.5)),
            ..PoolConfig::default()
        };
        assert!(matches!(
            ledger.create_pool(PoolId::from_uuid(ids.next_id()), bad_fee, t0()),
            Err(Error::InvalidInput(_))
        ));

        let no_token = PoolConfig {
            token_b: " ".to_string(),
            ..PoolConfig::default()
        };
        assert!(matches!(
            ledger.create_pool(PoolId::from_uuid(ids.next_id()), no_token, t0()),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(ledger.pool_count(), 0);
    }

    #[test]
    fn test_overflowing_deposit_leaves_indices_untouched() {
        let (ledger, ids, pool_id) = setup();
        let position_id = PositionId::from_uuid(ids.next_id());
        let half_plus_one = Decimal::MAX / dec!(2) + dec!(1);

        let result = ledger.add_liquidity(
            pool_id,
            position_id,
            HolderId::new("whale"),
            half_plus_one,
            half_plus_one,
            t0(),
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(matches!(
            ledger.get_position(position_id),
            Err(Error::PositionNotFound(_))
        ));
        assert_eq!(ledger.get_pool(pool_id).unwrap().total_liquidity, Decimal::ZERO);
    }

    #[test]
    fn test_add_liquidity_scenario() {
        let (ledger, ids, pool_id) = setup();
        let alice = HolderId::new("alice");

        let first = ledger
            .add_liquidity(
                pool_id,
                PositionId::from_uuid(ids.next_id()),
                alice.clone(),
                dec!(500),
                dec!(500),
                t0(),
            )
            .unwrap();
        assert_eq!(first.shares, dec!(1000));
        assert_eq!(first.share_percentage, dec!(100));
        assert_eq!(first.expected_annual_reward, dec!(300));

        let second = ledger
            .add_liquidity(
                pool_id,
                PositionId::from_uuid(ids.next_id()),
                alice.clone(),
                dec!(500),
                dec!(500),
                t0(),
            )
            .unwrap();
        assert_eq!(second.share_percentage, dec!(50));

        let analytics = ledger.pool_analytics(pool_id).unwrap();
        assert_eq!(analytics.total_liquidity, dec!(2000));
        assert_eq!(analytics.active_users, 2);
        assert_eq!(analytics.share_price, dec!(1));

        let summary = ledger.holder_summary(&alice, t0() + Duration::days(365));
        assert_eq!(summary.total_positions, 2);
        assert_eq!(summary.total_value, dec!(2000));
        assert_eq!(summary.pending_rewards.round_dp(10), dec!(600));
    }

    #[test]
    fn test_unknown_pool_and_position() {
        let (ledger, ids, _) = setup();
        let missing_pool = PoolId::from_uuid(ids.next_id());
        let missing_position = PositionId::from_uuid(ids.next_id());

        assert_eq!(
            ledger.accrue_fees(missing_pool, dec!(10)),
            Err(Error::PoolNotFound(missing_pool))
        );
        assert!(matches!(
            ledger.remove_liquidity(missing_position, dec!(1), t0()),
            Err(Error::PositionNotFound(_))
        ));
        assert!(matches!(
            ledger.harvest(missing_position, EsgScore::MAX, t0()),
            Err(Error::PositionNotFound(_))
        ));
    }

    #[test]
    fn test_withdrawn_position_stays_in_holder_history() {
        let (ledger, ids, pool_id) = setup();
        let bob = HolderId::new("bob");
        let position_id = PositionId::from_uuid(ids.next_id());
        ledger
            .add_liquidity(pool_id, position_id, bob.clone(), dec!(10), dec!(30), t0())
            .unwrap();
        ledger.remove_liquidity(position_id, dec!(40), t0()).unwrap();

        let summary = ledger.holder_summary(&bob, t0());
        assert_eq!(summary.total_positions, 0);
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert_eq!(summary.positions.len(), 1);

        assert_eq!(
            ledger.harvest(position_id, EsgScore::MAX, t0()),
            Err(Error::AlreadyWithdrawn(position_id))
        );
    }

    #[test]
    fn test_deactivated_pool_rejects_deposits() {
        let (ledger, ids, pool_id) = setup();
        ledger.deactivate_pool(pool_id).unwrap();
        assert_eq!(
            ledger
                .add_liquidity(
                    pool_id,
                    PositionId::from_uuid(ids.next_id()),
                    HolderId::new("dave"),
                    dec!(1),
                    dec!(1),
                    t0(),
                )
                .map(|p| p.shares),
            Err(Error::PoolInactive(pool_id))
        );
    }

    #[test]
    fn test_all_pools_summary() {
        let (ledger, ids, first) = setup();
        let second = PoolId::from_uuid(ids.next_id());
        ledger
            .create_pool(
                second,
                PoolConfig {
                    pool_type: crate::types::PoolType::EsgCarbon,
                    token_a: "ESG".to_string(),
                    token_b: "CO2".to_string(),
                    fee_rate: Some(dec!(0.01)),
                },
                t0(),
            )
            .unwrap();

        for pool_id in [first, second] {
            ledger
                .add_liquidity(
                    pool_id,
                    PositionId::from_uuid(ids.next_id()),
                    HolderId::new("erin"),
                    dec!(100),
                    dec!(100),
                    t0(),
                )
                .unwrap();
        }
        ledger.accrue_fees(second, dec!(1000)).unwrap();

        let summary = ledger.all_pools_summary();
        assert_eq!(summary.total_pools, 2);
        assert_eq!(summary.total_liquidity, dec!(400));
        assert_eq!(summary.total_fees, dec!(10));
        assert_eq!(summary.total_users, 2);
    }

    #[test]
    fn test_concurrent_deposits_conserve_liquidity() {
        let (ledger, ids, pool_id) = setup();
        let ledger = Arc::new(ledger);
        let ids = Arc::new(ids);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        ledger
                            .add_liquidity(
                                pool_id,
                                PositionId::from_uuid(ids.next_id()),
                                HolderId::new(format!("holder-{}", i)),
                                dec!(3),
                                dec!(7),
                                t0(),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let analytics = ledger.pool_analytics(pool_id).unwrap();
        assert_eq!(analytics.total_liquidity, dec!(2000));
        assert_eq!(analytics.total_shares, dec!(2000));
        assert_eq!(analytics.active_users, 200);
    }
}

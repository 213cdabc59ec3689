//! Pool book: one pool and the positions opened against it
//!
//! All share, fee and reward math lives here and runs on `&mut self`, so
//! the ledger only has to hold the pool's lock around a single call.
//!
//! # Share unit
//!
//! ```text
//! bootstrap (no shares outstanding):  shares = amount_a + amount_b
//! otherwise:                          shares = value × total_shares / total_liquidity
//! ```
//!
//! Shares are priced against shares outstanding, never against value alone,
//! so `total_shares` is tracked independently of `total_liquidity`.
//!
//! # Fees
//!
//! Accrued fees raise `fee_per_share`. A position is owed
//! `shares × fee_per_share − fee_debt`; its debt is reset whenever it is
//! paid, so every fee is paid exactly once.

use crate::{
    types::{
        HarvestReward, LiquidityPool, LiquidityPosition, PoolAnalytics, PoolStatus,
        PositionStatus, Withdrawal,
    },
    Error, Result,
};
use chrono::{DateTime, Duration, Utc};
use esg_core::{EsgScore, HolderId, PositionId};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Pool state plus its positions
#[derive(Debug, Clone)]
pub struct PoolBook {
    pool: LiquidityPool,
    positions: HashMap<PositionId, LiquidityPosition>,
    harvest_bonus_cap: Decimal,
    days_per_year: u32,
}

impl PoolBook {
    /// Wrap a freshly created pool
    pub fn new(pool: LiquidityPool, harvest_bonus_cap: Decimal, days_per_year: u32) -> Self {
        Self {
            pool,
            positions: HashMap::new(),
            harvest_bonus_cap,
            days_per_year,
        }
    }

    /// Pool snapshot
    pub fn pool(&self) -> &LiquidityPool {
        &self.pool
    }

    /// Position snapshot
    pub fn position(&self, position_id: PositionId) -> Option<&LiquidityPosition> {
        self.positions.get(&position_id)
    }

    /// Deposit both tokens and issue shares
    pub fn deposit(
        &mut self,
        position_id: PositionId,
        holder: HolderId,
        amount_a: Decimal,
        amount_b: Decimal,
        now: DateTime<Utc>,
    ) -> Result<LiquidityPosition> {
        if amount_a <= Decimal::ZERO || amount_b <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "Both amounts must be positive, got {} / {}",
                amount_a, amount_b
            )));
        }
        if self.pool.status != PoolStatus::Active {
            return Err(Error::PoolInactive(self.pool.pool_id));
        }
        if self.positions.contains_key(&position_id) {
            return Err(Error::InvalidInput(format!(
                "Position {} already exists",
                position_id
            )));
        }

        let value = amount_a
            .checked_add(amount_b)
            .ok_or_else(|| overflow("Deposit value"))?;
        let shares = self.shares_for(value)?;
        let post_total_shares = self
            .pool
            .total_shares
            .checked_add(shares)
            .ok_or_else(|| overflow("Pool shares"))?;
        let post_total_liquidity = self
            .pool
            .total_liquidity
            .checked_add(value)
            .ok_or_else(|| overflow("Pool liquidity"))?;
        let share_percentage = shares / post_total_shares * Decimal::ONE_HUNDRED;
        let expected_annual_reward = value
            .checked_mul(self.pool.total_apy)
            .map(|v| v / Decimal::ONE_HUNDRED)
            .ok_or_else(|| overflow("Expected reward"))?;
        let fee_debt = shares
            .checked_mul(self.pool.fee_per_share)
            .ok_or_else(|| overflow("Fee debt"))?;

        let position = LiquidityPosition {
            position_id,
            pool_id: self.pool.pool_id,
            holder,
            amount_a,
            amount_b,
            deposited_a: amount_a,
            deposited_b: amount_b,
            shares,
            share_percentage,
            apy: self.pool.total_apy,
            expected_annual_reward,
            fee_debt,
            fees_claimed: Decimal::ZERO,
            rewards_harvested: Decimal::ZERO,
            created_at: now,
            last_harvested_at: now,
            status: PositionStatus::Active,
        };

        self.pool.total_liquidity = post_total_liquidity;
        self.pool.total_shares = post_total_shares;
        self.pool.active_users += 1;
        self.positions.insert(position_id, position.clone());

        Ok(position)
    }

    /// Shares issued for a deposit of `value`
    fn shares_for(&self, value: Decimal) -> Result<Decimal> {
        if self.pool.total_shares.is_zero() || self.pool.total_liquidity.is_zero() {
            Ok(value)
        } else {
            value
                .checked_mul(self.pool.total_shares)
                .and_then(|v| v.checked_div(self.pool.total_liquidity))
                .ok_or_else(|| overflow("Issued shares"))
        }
    }

    /// Redeem shares for the proportional part of the held amounts plus all
    /// fees owed to the position
    pub fn withdraw(
        &mut self,
        position_id: PositionId,
        shares_to_remove: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Withdrawal> {
        let fee_per_share = self.pool.fee_per_share;
        let unclaimed = self.pool.unclaimed_fees();

        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(Error::PositionNotFound(position_id))?;

        if !position.is_active() {
            return Err(Error::AlreadyWithdrawn(position_id));
        }
        if shares_to_remove <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "Shares to remove must be positive, got {}",
                shares_to_remove
            )));
        }
        if shares_to_remove > position.shares {
            return Err(Error::InvalidInput(format!(
                "Cannot remove {} shares, position holds {}",
                shares_to_remove, position.shares
            )));
        }

        let full_exit = shares_to_remove == position.shares;
        let (amount_a, amount_b) = if full_exit {
            (position.amount_a, position.amount_b)
        } else {
            (
                position.amount_a * shares_to_remove / position.shares,
                position.amount_b * shares_to_remove / position.shares,
            )
        };

        let owed = position.shares * fee_per_share - position.fee_debt;
        let fees_earned = owed.max(Decimal::ZERO).min(unclaimed);

        position.amount_a -= amount_a;
        position.amount_b -= amount_b;
        position.shares -= shares_to_remove;
        position.fee_debt = position.shares * fee_per_share;
        position.fees_claimed += fees_earned;
        if full_exit {
            position.status = PositionStatus::Withdrawn;
        }

        let withdrawal = Withdrawal {
            position_id,
            pool_id: position.pool_id,
            holder: position.holder.clone(),
            shares_removed: shares_to_remove,
            amount_a,
            amount_b,
            fees_earned,
            total_withdrawal: amount_a + amount_b + fees_earned,
            remaining_shares: position.shares,
            status: position.status,
            removed_at: now,
        };

        self.pool.total_liquidity -= amount_a + amount_b;
        self.pool.total_shares -= shares_to_remove;
        self.pool.fees_paid += fees_earned;
        if full_exit {
            self.pool.active_users -= 1;
        }

        Ok(withdrawal)
    }

    /// Accrue swap fees on `volume`; returns the fee taken
    pub fn accrue_fees(&mut self, volume: Decimal) -> Result<Decimal> {
        if volume <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "Volume must be positive, got {}",
                volume
            )));
        }
        if self.pool.total_shares.is_zero() {
            return Err(Error::InvalidInput(format!(
                "Pool {} has no liquidity to distribute fees to",
                self.pool.pool_id
            )));
        }

        let fee = volume * self.pool.fee_rate;
        self.pool.total_fees += fee;
        self.pool.fee_per_share += fee / self.pool.total_shares;
        Ok(fee)
    }

    /// Pay the yield-farming reward for whole days since the last harvest
    pub fn harvest(
        &mut self,
        position_id: PositionId,
        holder_esg_score: EsgScore,
        now: DateTime<Utc>,
    ) -> Result<HarvestReward> {
        let total_apy = self.pool.total_apy;
        let days_per_year = self.days_per_year;
        let bonus_cap = self.harvest_bonus_cap;

        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(Error::PositionNotFound(position_id))?;

        if !position.is_active() {
            return Err(Error::AlreadyWithdrawn(position_id));
        }

        let days_elapsed = whole_days_since(position.last_harvested_at, now);
        let base_reward = base_reward(position.shares, total_apy, days_per_year, days_elapsed);
        let esg_bonus = base_reward * holder_esg_score.fraction() * bonus_cap;
        let total_reward = base_reward + esg_bonus;

        position.last_harvested_at += Duration::days(days_elapsed);
        position.rewards_harvested += total_reward;

        Ok(HarvestReward {
            position_id,
            holder: position.holder.clone(),
            days_elapsed,
            base_reward,
            esg_bonus,
            total_reward,
            holder_esg_score,
            harvested_at: now,
        })
    }

    /// Base reward accrued since the position's watermark, without paying it
    pub fn pending_reward(&self, position: &LiquidityPosition, now: DateTime<Utc>) -> Decimal {
        if !position.is_active() {
            return Decimal::ZERO;
        }
        let days = whole_days_since(position.last_harvested_at, now);
        base_reward(position.shares, self.pool.total_apy, self.days_per_year, days)
    }

    /// Close the pool to deposits
    pub fn deactivate(&mut self) {
        self.pool.status = PoolStatus::Inactive;
    }

    /// Consistent snapshot of the pool
    pub fn analytics(&self) -> PoolAnalytics {
        PoolAnalytics {
            pool_id: self.pool.pool_id,
            total_liquidity: self.pool.total_liquidity,
            total_shares: self.pool.total_shares,
            share_price: self.pool.share_price(),
            total_fees: self.pool.total_fees,
            unclaimed_fees: self.pool.unclaimed_fees(),
            active_users: self.pool.active_users,
            base_apy: self.pool.base_apy,
            esg_bonus_apy: self.pool.esg_bonus_apy,
            total_apy: self.pool.total_apy,
            status: self.pool.status,
        }
    }
}

fn overflow(what: &str) -> Error {
    Error::InvalidInput(format!("{} overflows", what))
}

/// Whole days from `since` to `now`, truncated, never negative
fn whole_days_since(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days().max(0)
}

/// `shares × (apy / 100 / days_per_year) × days`
fn base_reward(shares: Decimal, apy: Decimal, days_per_year: u32, days: i64) -> Decimal {
    let daily_rate = apy / Decimal::ONE_HUNDRED / Decimal::from(days_per_year);
    shares * daily_rate * Decimal::from(days)
}

//! Core types for the liquidity pool ledger

use chrono::{DateTime, Utc};
use esg_core::{EsgScore, HolderId, PoolId, PositionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ESG pool family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// ESG / GST utility token
    #[default]
    EsgGst,
    /// ESG / stablecoin
    EsgStable,
    /// ESG / carbon credit
    EsgCarbon,
    /// ESG / tax credit
    EsgTax,
}

impl PoolType {
    /// Ledger code
    pub fn code(&self) -> &'static str {
        match self {
            PoolType::EsgGst => "esg_gst",
            PoolType::EsgStable => "esg_stable",
            PoolType::EsgCarbon => "esg_carbon",
            PoolType::EsgTax => "esg_tax",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Pool creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool family
    #[serde(default)]
    pub pool_type: PoolType,

    /// First token symbol
    pub token_a: String,

    /// Second token symbol
    pub token_b: String,

    /// Fee rate override; engine default when absent
    #[serde(default)]
    pub fee_rate: Option<Decimal>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_type: PoolType::EsgGst,
            token_a: "ESG".to_string(),
            token_b: "GST".to_string(),
            fee_rate: None,
        }
    }
}

/// Pool status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    /// Accepting deposits
    Active,
    /// Closed to deposits; withdrawals and harvests still allowed
    Inactive,
}

/// Two-asset liquidity pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    /// Pool ID
    pub pool_id: PoolId,

    /// Pool family
    pub pool_type: PoolType,

    /// First token symbol
    pub token_a: String,

    /// Second token symbol
    pub token_b: String,

    /// Swap fee rate in [0, 1]
    pub fee_rate: Decimal,

    /// Base APY in percent
    pub base_apy: Decimal,

    /// ESG bonus APY in percent
    pub esg_bonus_apy: Decimal,

    /// `base_apy + esg_bonus_apy`
    pub total_apy: Decimal,

    /// Σ(amount_a + amount_b) over active positions
    pub total_liquidity: Decimal,

    /// Shares outstanding over active positions
    pub total_shares: Decimal,

    /// Fees accrued since creation
    pub total_fees: Decimal,

    /// Fees paid out to withdrawing positions
    pub fees_paid: Decimal,

    /// Accrued fees per outstanding share
    pub fee_per_share: Decimal,

    /// Positions currently active
    pub active_users: u64,

    /// Pool status
    pub status: PoolStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl LiquidityPool {
    /// Value of one share (1 at bootstrap)
    pub fn share_price(&self) -> Decimal {
        if self.total_shares.is_zero() {
            Decimal::ONE
        } else {
            self.total_liquidity / self.total_shares
        }
    }

    /// Fees accrued but not yet paid out
    pub fn unclaimed_fees(&self) -> Decimal {
        self.total_fees - self.fees_paid
    }
}

/// Position status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Holding shares
    Active,
    /// All shares redeemed (terminal)
    Withdrawn,
}

/// Holder's claim on a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    /// Position ID
    pub position_id: PositionId,

    /// Pool ID
    pub pool_id: PoolId,

    /// Holder
    pub holder: HolderId,

    /// Token A still held
    pub amount_a: Decimal,

    /// Token B still held
    pub amount_b: Decimal,

    /// Token A contributed at entry
    pub deposited_a: Decimal,

    /// Token B contributed at entry
    pub deposited_b: Decimal,

    /// Shares held
    pub shares: Decimal,

    /// Share of the pool right after the deposit, in percent
    pub share_percentage: Decimal,

    /// Pool APY at entry, in percent
    pub apy: Decimal,

    /// `(deposited_a + deposited_b) × apy / 100`
    pub expected_annual_reward: Decimal,

    /// `shares × fee_per_share` at the last fee checkpoint
    pub fee_debt: Decimal,

    /// Fees paid to this position
    pub fees_claimed: Decimal,

    /// Rewards harvested so far
    pub rewards_harvested: Decimal,

    /// Deposit timestamp
    pub created_at: DateTime<Utc>,

    /// Harvest watermark; starts at `created_at`
    pub last_harvested_at: DateTime<Utc>,

    /// Position status
    pub status: PositionStatus,
}

impl LiquidityPosition {
    /// Value still held (`amount_a + amount_b`)
    pub fn value(&self) -> Decimal {
        self.amount_a + self.amount_b
    }

    /// Check if position is active
    pub fn is_active(&self) -> bool {
        self.status == PositionStatus::Active
    }
}

/// Result of redeeming shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Position ID
    pub position_id: PositionId,

    /// Pool ID
    pub pool_id: PoolId,

    /// Holder
    pub holder: HolderId,

    /// Shares redeemed
    pub shares_removed: Decimal,

    /// Token A returned
    pub amount_a: Decimal,

    /// Token B returned
    pub amount_b: Decimal,

    /// Fees paid with this withdrawal
    pub fees_earned: Decimal,

    /// `amount_a + amount_b + fees_earned`
    pub total_withdrawal: Decimal,

    /// Shares left on the position
    pub remaining_shares: Decimal,

    /// Position status after the withdrawal
    pub status: PositionStatus,

    /// Withdrawal timestamp
    pub removed_at: DateTime<Utc>,
}

/// Yield-farming reward for one harvest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReward {
    /// Position ID
    pub position_id: PositionId,

    /// Holder
    pub holder: HolderId,

    /// Whole days paid by this harvest
    pub days_elapsed: i64,

    /// `shares × total_apy / 100 / 365 × days`
    pub base_reward: Decimal,

    /// `base_reward × score / 100 × harvest_bonus_cap`
    pub esg_bonus: Decimal,

    /// `base_reward + esg_bonus`
    pub total_reward: Decimal,

    /// Holder score used for the bonus
    pub holder_esg_score: EsgScore,

    /// Harvest timestamp
    pub harvested_at: DateTime<Utc>,
}

/// Consistent snapshot of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAnalytics {
    /// Pool ID
    pub pool_id: PoolId,

    /// Σ(amount_a + amount_b) over active positions
    pub total_liquidity: Decimal,

    /// Shares outstanding
    pub total_shares: Decimal,

    /// Value of one share
    pub share_price: Decimal,

    /// Fees accrued since creation
    pub total_fees: Decimal,

    /// Fees not yet paid out
    pub unclaimed_fees: Decimal,

    /// Positions currently active
    pub active_users: u64,

    /// Base APY in percent
    pub base_apy: Decimal,

    /// ESG bonus APY in percent
    pub esg_bonus_apy: Decimal,

    /// Total APY in percent
    pub total_apy: Decimal,

    /// Pool status
    pub status: PoolStatus,
}

/// Holder's positions across pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderSummary {
    /// Holder
    pub holder: HolderId,

    /// Active positions
    pub total_positions: usize,

    /// Value held across active positions
    pub total_value: Decimal,

    /// Base rewards accrued since each position's watermark
    pub pending_rewards: Decimal,

    /// Every position the holder ever opened, oldest first
    pub positions: Vec<LiquidityPosition>,
}

/// Aggregate over all pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolsSummary {
    /// Pool count
    pub total_pools: usize,

    /// Σ total_liquidity
    pub total_liquidity: Decimal,

    /// Σ total_fees
    pub total_fees: Decimal,

    /// Σ active_users
    pub total_users: u64,
}

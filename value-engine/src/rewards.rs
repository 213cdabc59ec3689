//! Governance votes, activity rewards and monetization estimates
//!
//! Pure functions of an asset's score and fiscal value. Nothing here touches
//! ledger state.

use chrono::{DateTime, Utc};
use esg_core::{AssetId, EsgAsset, EsgScore, HolderId, VoteId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Reward per unit of voting power
pub const VOTE_REWARD_MULTIPLIER: Decimal = dec!(10);

/// Activity reward at score 100
pub const ACTIVITY_BASE_REWARD: Decimal = dec!(10);

/// Ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    /// In favour
    For,
    /// Against
    Against,
    /// Abstain
    Abstain,
}

/// Recorded governance vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// Vote ID
    pub vote_id: VoteId,

    /// Asset whose score weights the vote
    pub asset_id: AssetId,

    /// Proposal voted on
    pub proposal_id: String,

    /// Ballot choice
    pub choice: VoteChoice,

    /// Asset score at vote time
    pub esg_score: EsgScore,

    /// `esg_score / 100`
    pub voting_power: Decimal,

    /// `voting_power × 10`
    pub reward: Decimal,

    /// Vote timestamp
    pub cast_at: DateTime<Utc>,
}

/// Voting power carried by a score, in [0, 1]
pub fn voting_power(score: EsgScore) -> Decimal {
    score.fraction()
}

/// Participation reward for a vote
pub fn vote_reward(score: EsgScore) -> Decimal {
    voting_power(score) * VOTE_REWARD_MULTIPLIER
}

/// Utility-token reward for a sustainable activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReward {
    /// Rewarded holder
    pub holder: HolderId,

    /// Free-form activity label
    pub activity: String,

    /// Score used for the reward
    pub esg_score: EsgScore,

    /// `10 × esg_score / 100`
    pub reward_amount: Decimal,

    /// Whole tokens credited (`reward_amount` truncated)
    pub tokens_earned: u64,

    /// Reward timestamp
    pub rewarded_at: DateTime<Utc>,
}

/// Reward amount and whole tokens for an activity
pub fn activity_reward(score: EsgScore) -> (Decimal, u64) {
    let amount = ACTIVITY_BASE_REWARD * score.fraction();
    let tokens = amount.trunc().to_u64().unwrap_or(0);
    (amount, tokens)
}

/// Monetization estimates for an asset
///
/// The five terms are independent estimates of what the asset could earn
/// through each channel. They are not exclusive claims on the same value, so
/// `total_potential_value` is an upper-bound style aggregate, not a balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetizationOptions {
    /// Asset ID
    pub asset_id: AssetId,

    /// Asset score
    pub esg_score: EsgScore,

    /// `fiscal_value × 0.03`
    pub tokenization_reward: Decimal,

    /// `fiscal_value × 0.08 × esg_score / 100`
    pub staking_yield: Decimal,

    /// `esg_score × 2`
    pub governance_reward: Decimal,

    /// `fiscal_value × 0.15`
    pub tax_credits: Decimal,

    /// `esg_score × 0.5`
    pub carbon_credits: Decimal,

    /// Sum of the five estimates
    pub total_potential_value: Decimal,
}

impl MonetizationOptions {
    /// Estimate every channel for an asset
    pub fn for_asset(asset: &EsgAsset) -> Self {
        let fiscal = asset.fiscal_value;
        let score = asset.esg_score;

        let tokenization_reward = fiscal * dec!(0.03);
        let staking_yield = fiscal * dec!(0.08) * score.fraction();
        let governance_reward = score.value() * dec!(2);
        let tax_credits = fiscal * dec!(0.15);
        let carbon_credits = score.value() * dec!(0.5);

        Self {
            asset_id: asset.asset_id,
            esg_score: score,
            tokenization_reward,
            staking_yield,
            governance_reward,
            tax_credits,
            carbon_credits,
            total_potential_value: tokenization_reward
                + staking_yield
                + governance_reward
                + tax_credits
                + carbon_credits,
        }
    }
}

//! Value engine facade
//!
//! Owns the asset collection and coordinates the stake and liquidity
//! ledgers. Every successful mutation is handed to the [`LedgerClient`]
//! afterwards; a failed commit is logged and counted, never surfaced.

use crate::{
    config::Config,
    holders::{HolderScores, StaticHolderScores},
    ledger_client::{LedgerClient, LedgerRecord, TracingLedger},
    metrics::Metrics,
    rewards::{
        activity_reward, vote_reward, voting_power, ActivityReward, MonetizationOptions,
        VoteChoice, VoteReceipt,
    },
    Error, Result,
};
use dashmap::{mapref::entry::Entry, DashMap};
use esg_core::{
    eligible_credits, invoice_fingerprint, score, sustainability_bonus, AssetId, Clock,
    EsgAsset, EsgScore, HolderId, IdGenerator, InvoiceRecord, PoolId, PositionId, Rarity,
    StakeId, SystemClock, UuidV7Ids, VoteId,
};
use liquidity::{
    HarvestReward, HolderSummary, LiquidityLedger, LiquidityPool, LiquidityPosition,
    PoolAnalytics, PoolConfig, PoolsSummary, Withdrawal,
};
use rust_decimal::Decimal;
use staking::{StakeLedger, StakePosition, StakeSettlement};
use std::fmt;
use std::sync::Arc;

/// ESG value engine
pub struct ValueEngine {
    config: Config,

    /// Minted assets
    assets: DashMap<AssetId, EsgAsset>,

    /// Invoice fingerprint → asset minted from it
    fingerprints: DashMap<String, AssetId>,

    stakes: StakeLedger,
    liquidity: LiquidityLedger,

    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    ledger: Arc<dyn LedgerClient>,
    holder_scores: Arc<dyn HolderScores>,

    metrics: Metrics,
}

impl fmt::Debug for ValueEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEngine")
            .field("service_name", &self.config.service_name)
            .field("assets", &self.assets.len())
            .field("stakes", &self.stakes.len())
            .field("pools", &self.liquidity.pool_count())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl ValueEngine {
    /// Create an engine with the system clock, time-ordered ids and the
    /// tracing ledger
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            stakes: StakeLedger::new(config.staking.clone()),
            liquidity: LiquidityLedger::new(config.pools.clone()),
            config,
            assets: DashMap::new(),
            fingerprints: DashMap::new(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Ids),
            ledger: Arc::new(TracingLedger::new()),
            holder_scores: Arc::new(StaticHolderScores::default()),
            metrics: Metrics::new()?,
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the identifier generator
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the external ledger
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Replace the holder score source
    pub fn with_holder_scores(mut self, holder_scores: Arc<dyn HolderScores>) -> Self {
        self.holder_scores = holder_scores;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn commit(&self, record: LedgerRecord) {
        match self.ledger.commit(&record) {
            Ok(tx_id) => tracing::debug!(kind = record.kind(), %tx_id, "Committed"),
            Err(e) => {
                self.metrics.commit_failures.inc();
                tracing::warn!(kind = record.kind(), error = %e, "Ledger commit failed");
            }
        }
    }

    fn holder_score(&self, holder: &HolderId) -> Result<EsgScore> {
        let raw = self.holder_scores.holder_esg_score(holder);
        Ok(EsgScore::try_from_f64(raw)?)
    }

    // ===== Assets =====

    /// Score an invoice and mint its immutable asset
    ///
    /// Each invoice (by fingerprint) mints at most one asset.
    pub fn mint_from_invoice(&self, invoice: &InvoiceRecord) -> Result<EsgAsset> {
        invoice.validate()?;

        let esg_score = score(invoice);
        let fingerprint = invoice_fingerprint(invoice);
        let asset_id = AssetId::from_uuid(self.ids.next_id());

        match self.fingerprints.entry(fingerprint.clone()) {
            Entry::Occupied(existing) => {
                return Err(Error::InvalidInput(format!(
                    "Invoice {} already minted as {}",
                    invoice.invoice_number,
                    existing.get()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(asset_id);
            }
        }

        let asset = EsgAsset {
            asset_id,
            invoice_fingerprint: fingerprint,
            esg_score,
            rarity: Rarity::from_score(esg_score),
            sustainability_bonus: sustainability_bonus(invoice),
            fiscal_value: invoice.amount,
            tax_credits: eligible_credits(invoice.amount),
            carbon_offset_kg: invoice.carbon_offset_kg,
            immutable: true,
            created_at: self.clock.now(),
        };
        self.assets.insert(asset_id, asset.clone());
        self.metrics.assets_minted.inc();

        tracing::info!(
            asset = %asset_id,
            invoice = %invoice.invoice_number,
            score = %esg_score,
            rarity = %asset.rarity,
            credits = asset.tax_credits.len(),
            "Minted ESG asset"
        );

        self.commit(LedgerRecord::AssetMinted(asset.clone()));
        Ok(asset)
    }

    /// Asset snapshot
    pub fn get_asset(&self, asset_id: AssetId) -> Result<EsgAsset> {
        self.assets
            .get(&asset_id)
            .map(|asset| asset.value().clone())
            .ok_or(Error::AssetNotFound(asset_id))
    }

    /// Every minted asset, oldest first
    pub fn assets(&self) -> Vec<EsgAsset> {
        let mut assets: Vec<EsgAsset> = self.assets.iter().map(|a| a.value().clone()).collect();
        assets.sort_by_key(|a| (a.created_at, a.asset_id));
        assets
    }

    /// Independent monetization estimates for an asset
    pub fn monetization_options(&self, asset_id: AssetId) -> Result<MonetizationOptions> {
        let asset = self.get_asset(asset_id)?;
        Ok(MonetizationOptions::for_asset(&asset))
    }

    // ===== Staking =====

    /// Lock principal against an asset at a yield fixed now
    pub fn open_stake(
        &self,
        asset_id: AssetId,
        principal: Decimal,
        duration_days: u32,
    ) -> Result<StakePosition> {
        let esg_score = self.get_asset(asset_id)?.esg_score;
        let stake_id = StakeId::from_uuid(self.ids.next_id());

        let position = self.stakes.open_stake(
            stake_id,
            asset_id,
            esg_score,
            principal,
            duration_days,
            self.clock.now(),
        )?;
        self.metrics.stakes_opened.inc();

        self.commit(LedgerRecord::StakeOpened(position.clone()));
        Ok(position)
    }

    /// Release a stake's precomputed reward
    pub fn settle_stake(&self, stake_id: StakeId) -> Result<StakeSettlement> {
        let settlement = self.stakes.mature_and_settle(stake_id, self.clock.now())?;
        self.metrics.stakes_settled.inc();

        self.commit(LedgerRecord::StakeSettled(settlement.clone()));
        Ok(settlement)
    }

    /// Mark every stake whose duration has elapsed as matured
    pub fn refresh_stakes(&self) -> usize {
        self.stakes.refresh_maturity(self.clock.now())
    }

    /// Stake snapshot
    pub fn get_stake(&self, stake_id: StakeId) -> Result<StakePosition> {
        Ok(self.stakes.get(stake_id)?)
    }

    /// Stakes opened against an asset
    pub fn stakes_for_asset(&self, asset_id: AssetId) -> Vec<StakePosition> {
        self.stakes.positions_for_asset(asset_id)
    }

    // ===== Governance and activity =====

    /// Cast a governance vote weighted by the asset's score
    pub fn vote(
        &self,
        asset_id: AssetId,
        proposal_id: impl Into<String>,
        choice: VoteChoice,
    ) -> Result<VoteReceipt> {
        let proposal_id = proposal_id.into();
        if proposal_id.trim().is_empty() {
            return Err(Error::InvalidInput("Proposal id must not be empty".to_string()));
        }
        let esg_score = self.get_asset(asset_id)?.esg_score;

        let receipt = VoteReceipt {
            vote_id: VoteId::from_uuid(self.ids.next_id()),
            asset_id,
            proposal_id,
            choice,
            esg_score,
            voting_power: voting_power(esg_score),
            reward: vote_reward(esg_score),
            cast_at: self.clock.now(),
        };

        tracing::info!(
            vote = %receipt.vote_id,
            asset = %asset_id,
            proposal = %receipt.proposal_id,
            voting_power = %receipt.voting_power,
            "Vote cast"
        );

        self.commit(LedgerRecord::VoteCast(receipt.clone()));
        Ok(receipt)
    }

    /// Reward a holder's sustainable activity with utility tokens
    pub fn reward_activity(
        &self,
        holder: HolderId,
        activity: impl Into<String>,
        esg_score: f64,
    ) -> Result<ActivityReward> {
        let esg_score = EsgScore::try_from_f64(esg_score)?;
        let (reward_amount, tokens_earned) = activity_reward(esg_score);

        let reward = ActivityReward {
            holder,
            activity: activity.into(),
            esg_score,
            reward_amount,
            tokens_earned,
            rewarded_at: self.clock.now(),
        };
        tracing::info!(holder = %reward.holder, activity = %reward.activity, tokens_earned, "Activity rewarded");

        self.commit(LedgerRecord::ActivityRewarded(reward.clone()));
        Ok(reward)
    }

    // ===== Liquidity =====

    /// Create a pool with engine-supplied APYs
    pub fn create_pool(&self, config: PoolConfig) -> Result<LiquidityPool> {
        let pool_id = PoolId::from_uuid(self.ids.next_id());
        let pool = self.liquidity.create_pool(pool_id, config, self.clock.now())?;
        self.metrics.pools.set(self.liquidity.pool_count() as i64);

        self.commit(LedgerRecord::PoolCreated(pool.clone()));
        Ok(pool)
    }

    /// Deposit both tokens into a pool
    pub fn add_liquidity(
        &self,
        pool_id: PoolId,
        holder: HolderId,
        amount_a: Decimal,
        amount_b: Decimal,
    ) -> Result<LiquidityPosition> {
        let position_id = PositionId::from_uuid(self.ids.next_id());
        let position = self.liquidity.add_liquidity(
            pool_id,
            position_id,
            holder,
            amount_a,
            amount_b,
            self.clock.now(),
        )?;
        self.metrics.liquidity_adds.inc();

        self.commit(LedgerRecord::LiquidityAdded(position.clone()));
        Ok(position)
    }

    /// Redeem shares from a position
    pub fn remove_liquidity(
        &self,
        position_id: PositionId,
        shares_to_remove: Decimal,
    ) -> Result<Withdrawal> {
        let withdrawal =
            self.liquidity
                .remove_liquidity(position_id, shares_to_remove, self.clock.now())?;
        self.metrics.liquidity_removals.inc();

        self.commit(LedgerRecord::LiquidityRemoved(withdrawal.clone()));
        Ok(withdrawal)
    }

    /// Harvest yield since the position's last harvest, boosted by the
    /// holder's current score
    pub fn harvest(&self, position_id: PositionId) -> Result<HarvestReward> {
        let holder = self.liquidity.get_position(position_id)?.holder;
        let holder_score = self.holder_score(&holder)?;

        let reward = self
            .liquidity
            .harvest(position_id, holder_score, self.clock.now())?;

        self.commit(LedgerRecord::RewardsHarvested(reward.clone()));
        Ok(reward)
    }

    /// Accrue swap fees on a pool; returns the fee taken
    pub fn accrue_fees(&self, pool_id: PoolId, volume: Decimal) -> Result<Decimal> {
        let fee = self.liquidity.accrue_fees(pool_id, volume)?;

        self.commit(LedgerRecord::FeesAccrued {
            pool_id,
            volume,
            fee,
        });
        Ok(fee)
    }

    /// Close a pool to deposits
    pub fn deactivate_pool(&self, pool_id: PoolId) -> Result<()> {
        Ok(self.liquidity.deactivate_pool(pool_id)?)
    }

    /// Pool snapshot
    pub fn get_pool(&self, pool_id: PoolId) -> Result<LiquidityPool> {
        Ok(self.liquidity.get_pool(pool_id)?)
    }

    /// Position snapshot
    pub fn get_position(&self, position_id: PositionId) -> Result<LiquidityPosition> {
        Ok(self.liquidity.get_position(position_id)?)
    }

    /// Consistent pool snapshot
    pub fn pool_analytics(&self, pool_id: PoolId) -> Result<PoolAnalytics> {
        Ok(self.liquidity.pool_analytics(pool_id)?)
    }

    /// A holder's positions across pools
    pub fn holder_summary(&self, holder: &HolderId) -> HolderSummary {
        self.liquidity.holder_summary(holder, self.clock.now())
    }

    /// Aggregate over all pools
    pub fn all_pools_summary(&self) -> PoolsSummary {
        self.liquidity.all_pools_summary()
    }
}

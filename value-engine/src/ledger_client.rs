//! External ledger boundary
//!
//! The engine computes what a ledger would record and hands each result to
//! a [`LedgerClient`] after the mutation succeeds. Commit failures are
//! logged by the engine and never change an operation's outcome.

use crate::rewards::{ActivityReward, VoteReceipt};
use esg_core::{fingerprint::content_hash, EsgAsset, PoolId};
use liquidity::{HarvestReward, LiquidityPool, LiquidityPosition, Withdrawal};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use staking::{StakePosition, StakeSettlement};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;

/// Record submitted to the external ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecord {
    /// Asset minted from an invoice
    AssetMinted(EsgAsset),
    /// Stake opened
    StakeOpened(StakePosition),
    /// Stake settled
    StakeSettled(StakeSettlement),
    /// Governance vote cast
    VoteCast(VoteReceipt),
    /// Activity rewarded with utility tokens
    ActivityRewarded(ActivityReward),
    /// Pool created
    PoolCreated(LiquidityPool),
    /// Liquidity deposited
    LiquidityAdded(LiquidityPosition),
    /// Liquidity withdrawn
    LiquidityRemoved(Withdrawal),
    /// Yield harvested
    RewardsHarvested(HarvestReward),
    /// Swap fees accrued
    FeesAccrued {
        /// Pool ID
        pool_id: PoolId,
        /// Traded volume
        volume: Decimal,
        /// Fee taken
        fee: Decimal,
    },
}

impl LedgerRecord {
    /// Record kind, as serialized
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerRecord::AssetMinted(_) => "asset_minted",
            LedgerRecord::StakeOpened(_) => "stake_opened",
            LedgerRecord::StakeSettled(_) => "stake_settled",
            LedgerRecord::VoteCast(_) => "vote_cast",
            LedgerRecord::ActivityRewarded(_) => "activity_rewarded",
            LedgerRecord::PoolCreated(_) => "pool_created",
            LedgerRecord::LiquidityAdded(_) => "liquidity_added",
            LedgerRecord::LiquidityRemoved(_) => "liquidity_removed",
            LedgerRecord::RewardsHarvested(_) => "rewards_harvested",
            LedgerRecord::FeesAccrued { .. } => "fees_accrued",
        }
    }
}

/// Opaque transaction identifier returned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Wrap a ledger-issued identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commit failure reported by a ledger client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// Ledger refused the record
    #[error("Commit rejected: {0}")]
    Rejected(String),

    /// Ledger unreachable
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence callback supplied by the host
pub trait LedgerClient: Send + Sync + fmt::Debug {
    /// Persist a record; the engine only logs the outcome
    fn commit(&self, record: &LedgerRecord) -> Result<TxId, CommitError>;
}

/// Logs every record as JSON and issues content-hash transaction ids
#[derive(Debug, Default)]
pub struct TracingLedger {
    sequence: AtomicU64,
}

impl TracingLedger {
    /// Create new tracing ledger
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerClient for TracingLedger {
    fn commit(&self, record: &LedgerRecord) -> Result<TxId, CommitError> {
        let json =
            serde_json::to_string(record).map_err(|e| CommitError::Serialization(e.to_string()))?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut preimage = sequence.to_be_bytes().to_vec();
        preimage.extend_from_slice(json.as_bytes());
        let hash = content_hash(&preimage);
        let tx_id = TxId::new(format!("0x{}", &hash[..32]));

        tracing::info!(kind = record.kind(), tx_id = %tx_id, record = %json, "Ledger commit");
        Ok(tx_id)
    }
}

/// Discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLedger;

impl LedgerClient for NullLedger {
    fn commit(&self, _record: &LedgerRecord) -> Result<TxId, CommitError> {
        Ok(TxId::new("0x0"))
    }
}

/// Keeps every committed record in memory; can be switched to fail
#[derive(Debug, Default)]
pub struct RecordingLedger {
    records: Mutex<Vec<LedgerRecord>>,
    failing: AtomicBool,
}

impl RecordingLedger {
    /// Create new recording ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent commits fail with `Unavailable`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Records committed so far, oldest first
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().clone()
    }

    /// Kinds committed so far, oldest first
    pub fn kinds(&self) -> Vec<&'static str> {
        self.records.lock().iter().map(LedgerRecord::kind).collect()
    }
}

impl LedgerClient for RecordingLedger {
    fn commit(&self, record: &LedgerRecord) -> Result<TxId, CommitError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CommitError::Unavailable("recording ledger switched off".to_string()));
        }
        let mut records = self.records.lock();
        records.push(record.clone());
        Ok(TxId::new(format!("rec-{}", records.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esg_core::{IdGenerator, SequentialIds};
    use rust_decimal_macros::dec;

    fn fees_record() -> LedgerRecord {
        LedgerRecord::FeesAccrued {
            pool_id: PoolId::from_uuid(SequentialIds::new().next_id()),
            volume: dec!(1000),
            fee: dec!(3),
        }
    }

    #[test]
    fn test_record_serializes_with_kind_tag() {
        let json = serde_json::to_value(fees_record()).unwrap();
        assert_eq!(json["kind"], "fees_accrued");
        assert_eq!(json["fee"], "3");
    }

    #[test]
    fn test_tracing_ledger_issues_distinct_ids() {
        let ledger = TracingLedger::new();
        let a = ledger.commit(&fees_record()).unwrap();
        let b = ledger.commit(&fees_record()).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 34);
    }

    #[test]
    fn test_recording_ledger_failure_switch() {
        let ledger = RecordingLedger::new();
        ledger.commit(&fees_record()).unwrap();
        ledger.set_failing(true);
        assert!(matches!(
            ledger.commit(&fees_record()),
            Err(CommitError::Unavailable(_))
        ));
        assert_eq!(ledger.kinds(), vec!["fees_accrued"]);
    }
}

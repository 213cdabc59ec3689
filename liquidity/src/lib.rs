//! Liquidity Pool Ledger
//!
//! Two-asset ESG pools with proportional share issuance, pro-rata fee
//! distribution and a yield-farming harvest boosted by the holder's ESG
//! score.
//!
//! # Invariants
//!
//! - `total_liquidity` equals the value held by active positions
//! - `total_shares` equals the shares held by active positions
//! - fees paid out never exceed fees accrued
//! - a harvest pays each elapsed day at most once per position

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod types;

// Re-exports
pub use config::PoolDefaults;
pub use error::{Error, Result};
pub use ledger::LiquidityLedger;
pub use pool::PoolBook;
pub use types::{
    HarvestReward, HolderSummary, LiquidityPool, LiquidityPosition, PoolAnalytics, PoolConfig,
    PoolStatus, PoolType, PoolsSummary, PositionStatus, Withdrawal,
};

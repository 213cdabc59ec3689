//! ESG Value Engine
//!
//! Facade over scoring, the stake ledger and the liquidity ledger. Turns a
//! sustainability-rated invoice into an immutable ESG asset, then lets the
//! asset back stakes, governance votes and monetization estimates, and lets
//! holders provide liquidity to ESG pools.
//!
//! Host capabilities are injected:
//!
//! - [`esg_core::Clock`] for the current time
//! - [`esg_core::IdGenerator`] for identifiers
//! - [`LedgerClient`] for persisting results
//! - [`HolderScores`] for holder reputation
//!
//! ```text
//! invoice ──▶ score / credits / rarity ──▶ EsgAsset
//!                                            │
//!                     ┌──────────────────────┼─────────────────┐
//!                     ▼                      ▼                 ▼
//!                StakeLedger          vote / monetize    LiquidityLedger
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod holders;
pub mod ledger_client;
pub mod metrics;
pub mod rewards;

// Re-exports
pub use config::Config;
pub use engine::ValueEngine;
pub use error::{Error, Result};
pub use holders::{HolderScores, StaticHolderScores};
pub use ledger_client::{
    CommitError, LedgerClient, LedgerRecord, NullLedger, RecordingLedger, TracingLedger, TxId,
};
pub use metrics::Metrics;
pub use rewards::{ActivityReward, MonetizationOptions, VoteChoice, VoteReceipt};

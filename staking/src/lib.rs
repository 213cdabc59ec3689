//! Stake Ledger
//!
//! Locks principal against an ESG asset for a fixed number of days at a yield
//! fixed when the stake is opened.
//!
//! # Yield
//!
//! ```text
//! apy    = base_apy + esg_score / 100 × esg_bonus_max
//! reward = principal × apy / 100 × duration_days / 365
//! ```
//!
//! Simple interest, never compounded, never re-priced.
//!
//! # Lifecycle
//!
//! ```text
//! Active ──(duration elapsed)──▶ Matured
//!    │                              │
//!    └──────── settle ──────────────┴──▶ Withdrawn (terminal)
//! ```

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
pub mod types;

// Re-exports
pub use config::StakingConfig;
pub use error::{Error, Result};
pub use ledger::StakeLedger;
pub use types::{stake_terms, StakePosition, StakeSettlement, StakeStatus, StakeTerms};

//! ESG Core
//!
//! Pure scoring and classification primitives for the ESG value engine.
//!
//! # Components
//!
//! - **Scoring**: invoice attributes → bounded ESG score
//! - **Credits**: invoice amount → ordered fiscal credit entries
//! - **Tiers**: score → rarity, token balance → ESG level
//!
//! # Invariants
//!
//! - Scores always lie in `[0, 100]`
//! - Credit entries appear in fixed order: ICMS, IPI, PIS_COFINS
//! - Tier buckets partition their domain with no gaps or overlaps
//! - All money is exact `Decimal`, never floating point

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod clock;
pub mod credits;
pub mod error;
pub mod fingerprint;
pub mod ids;
pub mod scoring;
pub mod tier;
pub mod types;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use credits::{eligible_credits, total_credit_value};
pub use error::{Error, Result};
pub use fingerprint::invoice_fingerprint;
pub use ids::{
    AssetId, HolderId, IdGenerator, PoolId, PositionId, SequentialIds, StakeId, UuidV7Ids, VoteId,
};
pub use scoring::{score, score_breakdown, sustainability_bonus, ScoreBreakdown};
pub use tier::{EsgLevel, Rarity};
pub use types::{CreditEntry, CreditKind, EsgAsset, EsgScore, InvoiceRecord, Product};

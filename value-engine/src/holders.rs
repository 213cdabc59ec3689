//! Holder reputation lookup

use dashmap::DashMap;
use esg_core::HolderId;
use std::fmt;

/// Holder ESG score source supplied by the host
///
/// Implementations return a raw float; the engine rejects anything
/// non-finite or outside [0, 100] before it reaches a reward.
pub trait HolderScores: Send + Sync + fmt::Debug {
    /// Current score for a holder
    fn holder_esg_score(&self, holder: &HolderId) -> f64;
}

/// In-memory score table with a fallback for unknown holders
#[derive(Debug)]
pub struct StaticHolderScores {
    scores: DashMap<HolderId, f64>,
    fallback: f64,
}

impl StaticHolderScores {
    /// Empty table answering `fallback` for everyone
    pub fn new(fallback: f64) -> Self {
        Self {
            scores: DashMap::new(),
            fallback,
        }
    }

    /// Set a holder's score
    pub fn set(&self, holder: HolderId, score: f64) {
        self.scores.insert(holder, score);
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(self, holder: HolderId, score: f64) -> Self {
        self.set(holder, score);
        self
    }
}

impl Default for StaticHolderScores {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl HolderScores for StaticHolderScores {
    fn holder_esg_score(&self, holder: &HolderId) -> f64 {
        self.scores
            .get(holder)
            .map(|score| *score.value())
            .unwrap_or(self.fallback)
    }
}

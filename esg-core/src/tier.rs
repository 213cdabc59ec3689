//! Tier classification
//!
//! Monotone step functions. Each lower bound is inclusive, so the buckets
//! partition the domain exactly: 95.0 is Legendary, 94.999 is Epic.

use crate::types::EsgScore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset rarity, ordered from least to most rare
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// score < 70
    Common,
    /// 70 ≤ score < 80
    Uncommon,
    /// 80 ≤ score < 90
    Rare,
    /// 90 ≤ score < 95
    Epic,
    /// score ≥ 95
    Legendary,
}

impl Rarity {
    /// Classify a score
    pub fn from_score(score: EsgScore) -> Self {
        let s = score.value();
        if s >= dec!(95) {
            Rarity::Legendary
        } else if s >= dec!(90) {
            Rarity::Epic
        } else if s >= dec!(80) {
            Rarity::Rare
        } else if s >= dec!(70) {
            Rarity::Uncommon
        } else {
            Rarity::Common
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl From<EsgScore> for Rarity {
    fn from(score: EsgScore) -> Self {
        Rarity::from_score(score)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Holder level in the GST token economy, derived from balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EsgLevel {
    /// balance < 500
    Novice,
    /// 500 ≤ balance < 1000
    Beginner,
    /// 1000 ≤ balance < 2000
    Intermediate,
    /// 2000 ≤ balance < 5000
    GreenGuardian,
    /// balance ≥ 5000
    Master,
}

impl EsgLevel {
    /// Classify a GST balance
    pub fn from_balance(balance: Decimal) -> Self {
        if balance >= dec!(5000) {
            EsgLevel::Master
        } else if balance >= dec!(2000) {
            EsgLevel::GreenGuardian
        } else if balance >= dec!(1000) {
            EsgLevel::Intermediate
        } else if balance >= dec!(500) {
            EsgLevel::Beginner
        } else {
            EsgLevel::Novice
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            EsgLevel::Novice => "ESG Novice",
            EsgLevel::Beginner => "ESG Beginner",
            EsgLevel::Intermediate => "ESG Intermediate",
            EsgLevel::GreenGuardian => "Green Guardian",
            EsgLevel::Master => "ESG Master",
        }
    }
}

impl fmt::Display for EsgLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rarity(s: Decimal) -> Rarity {
        Rarity::from_score(EsgScore::new(s))
    }

    #[test]
    fn test_rarity_boundaries() {
        assert_eq!(rarity(dec!(95.0)), Rarity::Legendary);
        assert_eq!(rarity(dec!(94.999)), Rarity::Epic);
        assert_eq!(rarity(dec!(90)), Rarity::Epic);
        assert_eq!(rarity(dec!(89.99)), Rarity::Rare);
        assert_eq!(rarity(dec!(80)), Rarity::Rare);
        assert_eq!(rarity(dec!(70)), Rarity::Uncommon);
        assert_eq!(rarity(dec!(69.999)), Rarity::Common);
        assert_eq!(rarity(dec!(0)), Rarity::Common);
        assert_eq!(rarity(dec!(100)), Rarity::Legendary);
    }

    #[test]
    fn test_esg_level_boundaries() {
        assert_eq!(EsgLevel::from_balance(dec!(0)), EsgLevel::Novice);
        assert_eq!(EsgLevel::from_balance(dec!(499.99)), EsgLevel::Novice);
        assert_eq!(EsgLevel::from_balance(dec!(500)), EsgLevel::Beginner);
        assert_eq!(EsgLevel::from_balance(dec!(1000)), EsgLevel::Intermediate);
        assert_eq!(EsgLevel::from_balance(dec!(2000)), EsgLevel::GreenGuardian);
        assert_eq!(EsgLevel::from_balance(dec!(5000)), EsgLevel::Master);
    }

    #[test]
    fn test_rarity_display() {
        assert_eq!(Rarity::Uncommon.to_string(), "Uncommon");
        assert_eq!(EsgLevel::GreenGuardian.to_string(), "Green Guardian");
    }
}

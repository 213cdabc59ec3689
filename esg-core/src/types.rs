//! Core types for the ESG engine
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money, rates and scores)
//! - Deterministic serialization (serde)
//! - Immutability once received or minted

use crate::ids::AssetId;
use crate::tier::Rarity;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ESG score, always within `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EsgScore(Decimal);

impl EsgScore {
    /// Lowest possible score
    pub const MIN: EsgScore = EsgScore(Decimal::ZERO);

    /// Highest possible score
    pub const MAX: EsgScore = EsgScore(Decimal::ONE_HUNDRED);

    /// Create new score, clamped to `[0, 100]`
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Create from a host-supplied float, rejecting NaN, infinities and
    /// values outside `[0, 100]`
    pub fn try_from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::invalid(format!("ESG score must be finite, got {}", value)));
        }
        if !(0.0..=100.0).contains(&value) {
            return Err(Error::invalid(format!(
                "ESG score must be within [0, 100], got {}",
                value
            )));
        }
        Decimal::from_f64(value)
            .map(Self)
            .ok_or_else(|| Error::invalid(format!("ESG score {} is not representable", value)))
    }

    /// Raw score
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Score as a fraction of 100 (`score / 100`)
    pub fn fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for EsgScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Product line on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product name
    pub name: String,

    /// Free-text category (matched against ESG keywords)
    #[serde(default)]
    pub category: String,

    /// Flagged as sustainable by the issuer
    #[serde(default)]
    pub sustainable: bool,
}

impl Product {
    /// Create new product
    pub fn new(name: impl Into<String>, category: impl Into<String>, sustainable: bool) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            sustainable,
        }
    }
}

/// Sustainability-rated invoice, immutable once received
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Issuer's invoice number
    #[serde(default)]
    pub invoice_number: String,

    /// Invoice amount
    pub amount: Decimal,

    /// Product lines
    #[serde(default)]
    pub products: Vec<Product>,

    /// Declared ESG value
    #[serde(default)]
    pub esg_value: Decimal,

    /// Carbon offset in kilograms
    #[serde(default)]
    pub carbon_offset_kg: Decimal,

    /// Issuance date
    pub issued_on: NaiveDate,
}

impl InvoiceRecord {
    /// Reject negative quantities before anything is derived from them
    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(Error::invalid(format!(
                "Invoice amount must be non-negative, got {}",
                self.amount
            )));
        }
        if self.esg_value < Decimal::ZERO {
            return Err(Error::invalid(format!(
                "ESG value must be non-negative, got {}",
                self.esg_value
            )));
        }
        if self.carbon_offset_kg < Decimal::ZERO {
            return Err(Error::invalid(format!(
                "Carbon offset must be non-negative, got {}",
                self.carbon_offset_kg
            )));
        }
        Ok(())
    }

    /// Number of products flagged sustainable
    pub fn sustainable_count(&self) -> usize {
        self.products.iter().filter(|p| p.sustainable).count()
    }
}

/// Fiscal credit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreditKind {
    /// State VAT on goods and services
    #[serde(rename = "ICMS")]
    Icms,
    /// Federal excise on industrialized products
    #[serde(rename = "IPI")]
    Ipi,
    /// Federal social contributions
    #[serde(rename = "PIS_COFINS")]
    PisCofins,
}

impl CreditKind {
    /// All kinds, in the order entries are emitted
    pub const ALL: [CreditKind; 3] = [CreditKind::Icms, CreditKind::Ipi, CreditKind::PisCofins];

    /// Ledger code
    pub fn code(&self) -> &'static str {
        match self {
            CreditKind::Icms => "ICMS",
            CreditKind::Ipi => "IPI",
            CreditKind::PisCofins => "PIS_COFINS",
        }
    }

    /// Credit rate applied to the invoice amount
    pub fn rate(&self) -> Decimal {
        match self {
            CreditKind::Icms => dec!(0.18),
            CreditKind::Ipi => dec!(0.15),
            CreditKind::PisCofins => dec!(0.0365),
        }
    }

    /// Amount must be strictly greater than this to qualify
    pub fn threshold(&self) -> Decimal {
        match self {
            CreditKind::Icms => dec!(100),
            CreditKind::Ipi => dec!(500),
            CreditKind::PisCofins => dec!(200),
        }
    }

    /// Processing time in days
    pub fn processing_days(&self) -> u32 {
        match self {
            CreditKind::Icms => 45,
            CreditKind::Ipi => 60,
            CreditKind::PisCofins => 90,
        }
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Eligible fiscal credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditEntry {
    /// Credit type
    #[serde(rename = "type")]
    pub kind: CreditKind,

    /// Rate applied
    pub rate: Decimal,

    /// Credit value (`amount * rate`)
    pub value: Decimal,

    /// Processing time in days
    pub processing_days: u32,
}

/// Immutable ESG asset minted from an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsgAsset {
    /// Asset identity
    pub asset_id: AssetId,

    /// Content hash of invoice number, amount and date
    pub invoice_fingerprint: String,

    /// ESG score
    pub esg_score: EsgScore,

    /// Rarity derived from the score
    pub rarity: Rarity,

    /// Sustainability bonus (0.05 per sustainable product, capped at 0.20)
    pub sustainability_bonus: Decimal,

    /// Fiscal value (invoice amount)
    pub fiscal_value: Decimal,

    /// Eligible fiscal credits, in emission order
    pub tax_credits: Vec<CreditEntry>,

    /// Carbon offset in kilograms
    pub carbon_offset_kg: Decimal,

    /// Always true
    pub immutable: bool,

    /// Mint timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(amount: Decimal) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: "NF-001".to_string(),
            amount,
            products: vec![],
            esg_value: Decimal::ZERO,
            carbon_offset_kg: Decimal::ZERO,
            issued_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(EsgScore::new(dec!(130)), EsgScore::MAX);
        assert_eq!(EsgScore::new(dec!(-4)), EsgScore::MIN);
        assert_eq!(EsgScore::new(dec!(74)).fraction(), dec!(0.74));
    }

    #[test]
    fn test_score_from_f64_rejects_non_finite() {
        assert!(EsgScore::try_from_f64(f64::NAN).is_err());
        assert!(EsgScore::try_from_f64(f64::INFINITY).is_err());
        assert!(EsgScore::try_from_f64(-1.0).is_err());
        assert!(EsgScore::try_from_f64(100.5).is_err());
        assert_eq!(EsgScore::try_from_f64(80.0).unwrap().value(), dec!(80));
    }

    #[test]
    fn test_invoice_validation() {
        assert!(invoice(dec!(0)).validate().is_ok());
        assert!(invoice(dec!(1000)).validate().is_ok());

        let err = invoice(dec!(-1)).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let mut negative_offset = invoice(dec!(10));
        negative_offset.carbon_offset_kg = dec!(-0.5);
        assert!(negative_offset.validate().is_err());
    }

    #[test]
    fn test_invoice_deserializes_with_defaults() {
        let json = r#"{
            "amount": 250.50,
            "issued_on": "2024-03-01",
            "products": [{"name": "Soap", "category": "Eco", "sustainable": true}]
        }"#;
        let invoice: InvoiceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.amount, dec!(250.50));
        assert_eq!(invoice.esg_value, Decimal::ZERO);
        assert_eq!(invoice.sustainable_count(), 1);
    }

    #[test]
    fn test_credit_kind_codes() {
        assert_eq!(CreditKind::PisCofins.code(), "PIS_COFINS");
        assert_eq!(
            serde_json::to_string(&CreditKind::PisCofins).unwrap(),
            "\"PIS_COFINS\""
        );
    }
}

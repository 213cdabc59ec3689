//! ESG scoring engine
//!
//! ```text
//! score = clamp(50
//!             + 10 × sustainable products
//!             + min(esg_value / 100, 20)
//!             + 5 × products whose category matches an ESG keyword,
//!         0, 100)
//! ```
//!
//! The per-product terms are uncapped on their own; only the final sum is
//! clamped. Pure and deterministic.

use crate::types::{EsgScore, InvoiceRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Starting score for every invoice
pub const BASE_SCORE: Decimal = dec!(50);

/// Points per sustainable product
pub const SUSTAINABLE_PRODUCT_POINTS: Decimal = dec!(10);

/// Cap on the declared-value term
pub const VALUE_BONUS_CAP: Decimal = dec!(20);

/// Points per product in an ESG category
pub const CATEGORY_POINTS: Decimal = dec!(5);

/// Category keywords (matched against the lower-cased category)
pub const CATEGORY_KEYWORDS: [&str; 4] = ["orgânico", "sustentável", "eco", "verde"];

/// Sustainability bonus per sustainable product
pub const SUSTAINABILITY_BONUS_STEP: Decimal = dec!(0.05);

/// Cap on the sustainability bonus
pub const SUSTAINABILITY_BONUS_CAP: Decimal = dec!(0.20);

/// Per-term breakdown of a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Base term
    pub base: Decimal,
    /// Sustainable-product term
    pub sustainable_bonus: Decimal,
    /// Declared-value term
    pub value_bonus: Decimal,
    /// Category-keyword term
    pub category_bonus: Decimal,
    /// Clamped total
    pub total: EsgScore,
}

/// Compute the ESG score of an invoice
pub fn score(invoice: &InvoiceRecord) -> EsgScore {
    score_breakdown(invoice).total
}

/// Compute the ESG score with every term exposed
pub fn score_breakdown(invoice: &InvoiceRecord) -> ScoreBreakdown {
    let sustainable_bonus =
        SUSTAINABLE_PRODUCT_POINTS * Decimal::from(invoice.sustainable_count());

    let value_bonus = (invoice.esg_value / Decimal::ONE_HUNDRED).min(VALUE_BONUS_CAP);

    let category_matches = invoice
        .products
        .iter()
        .filter(|p| is_esg_category(&p.category))
        .count();
    let category_bonus = CATEGORY_POINTS * Decimal::from(category_matches);

    let total = EsgScore::new(BASE_SCORE + sustainable_bonus + value_bonus + category_bonus);

    tracing::debug!(
        invoice = %invoice.invoice_number,
        %sustainable_bonus,
        %value_bonus,
        %category_bonus,
        score = %total,
        "Computed ESG score"
    );

    ScoreBreakdown {
        base: BASE_SCORE,
        sustainable_bonus,
        value_bonus,
        category_bonus,
        total,
    }
}

/// Whether a free-text category names an ESG category
pub fn is_esg_category(category: &str) -> bool {
    let lowered = category.to_lowercase();
    CATEGORY_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Sustainability bonus: 0.05 per sustainable product, at most 0.20
pub fn sustainability_bonus(invoice: &InvoiceRecord) -> Decimal {
    (SUSTAINABILITY_BONUS_STEP * Decimal::from(invoice.sustainable_count()))
        .min(SUSTAINABILITY_BONUS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use chrono::NaiveDate;

    fn invoice(products: Vec<Product>, esg_value: Decimal) -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: "NF-100".to_string(),
            amount: dec!(1000),
            products,
            esg_value,
            carbon_offset_kg: dec!(0),
            issued_on: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    #[test]
    fn test_base_score() {
        assert_eq!(score(&invoice(vec![], dec!(0))).value(), dec!(50));
    }

    #[test]
    fn test_two_sustainable_products_with_declared_value() {
        let products = vec![
            Product::new("Cotton shirt", "Textiles", true),
            Product::new("Bamboo brush", "Hygiene", true),
        ];
        let breakdown = score_breakdown(&invoice(products, dec!(400)));
        assert_eq!(breakdown.sustainable_bonus, dec!(20));
        assert_eq!(breakdown.value_bonus, dec!(4));
        assert_eq!(breakdown.category_bonus, dec!(0));
        assert_eq!(breakdown.total.value(), dec!(74));
    }

    #[test]
    fn test_value_bonus_is_capped() {
        let breakdown = score_breakdown(&invoice(vec![], dec!(100000)));
        assert_eq!(breakdown.value_bonus, dec!(20));
        assert_eq!(breakdown.total.value(), dec!(70));
    }

    #[test]
    fn test_category_keywords_are_case_insensitive() {
        assert!(is_esg_category("Produtos ORGÂNICOS"));
        assert!(is_esg_category("Linha Verde"));
        assert!(is_esg_category("eco-friendly"));
        assert!(is_esg_category("Sustentável"));
        assert!(!is_esg_category("Electronics"));
    }

    #[test]
    fn test_score_clamped_at_100() {
        let products = (0..8)
            .map(|i| Product::new(format!("p{}", i), "eco", true))
            .collect();
        assert_eq!(score(&invoice(products, dec!(5000))), EsgScore::MAX);
    }

    #[test]
    fn test_sustainability_bonus_cap() {
        let one = invoice(vec![Product::new("a", "", true)], dec!(0));
        assert_eq!(sustainability_bonus(&one), dec!(0.05));

        let many = invoice(
            (0..6).map(|i| Product::new(format!("p{}", i), "", true)).collect(),
            dec!(0),
        );
        assert_eq!(sustainability_bonus(&many), dec!(0.20));
    }
}

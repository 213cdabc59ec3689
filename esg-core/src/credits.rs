//! Fiscal credit eligibility
//!
//! Each credit kind is gated independently by a strict minimum amount.
//! Entries are always emitted in [`CreditKind::ALL`] order, so raising the
//! amount across a threshold can only insert entries, never remove or
//! reorder them.

use crate::types::{CreditEntry, CreditKind};
use rust_decimal::Decimal;

/// Credits an invoice of `amount` qualifies for
pub fn eligible_credits(amount: Decimal) -> Vec<CreditEntry> {
    CreditKind::ALL
        .iter()
        .filter(|kind| amount > kind.threshold())
        .map(|kind| CreditEntry {
            kind: *kind,
            rate: kind.rate(),
            value: amount * kind.rate(),
            processing_days: kind.processing_days(),
        })
        .collect()
}

/// Sum of credit values
pub fn total_credit_value(entries: &[CreditEntry]) -> Decimal {
    entries.iter().map(|e| e.value).sum()
}

//! Invoice fingerprinting
//!
//! SHA-256 over invoice number, amount and issuance date, truncated to 16 hex
//! characters. Identifies the invoice, not the asset: re-minting the same
//! invoice yields the same fingerprint under a different asset id.

use crate::types::InvoiceRecord;
use sha2::{Digest, Sha256};

/// Length of the hex fingerprint
pub const FINGERPRINT_LEN: usize = 16;

/// Compute the invoice content hash
pub fn invoice_fingerprint(invoice: &InvoiceRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(invoice.invoice_number.as_bytes());
    hasher.update(invoice.amount.normalize().to_string().as_bytes());
    hasher.update(invoice.issued_on.format("%Y-%m-%d").to_string().as_bytes());

    let digest = hex::encode(hasher.finalize());
    digest[..FINGERPRINT_LEN].to_string()
}

/// Full SHA-256 hex digest of arbitrary bytes
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

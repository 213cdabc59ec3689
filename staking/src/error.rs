//! Error types for the stake ledger

use esg_core::StakeId;
use thiserror::Error;

/// Result type for staking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Staking errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Non-positive principal or duration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stake not found
    #[error("Stake not found: {0}")]
    StakeNotFound(StakeId),

    /// Stake already settled
    #[error("Stake already settled: {0}")]
    AlreadySettled(StakeId),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

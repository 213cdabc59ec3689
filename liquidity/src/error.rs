//! Error types for the liquidity pool ledger

use esg_core::{PoolId, PositionId};
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Liquidity errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Non-positive amounts, shares exceeding holdings, ...
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pool not found
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    /// Position not found
    #[error("Position not found: {0}")]
    PositionNotFound(PositionId),

    /// Position fully withdrawn
    #[error("Position already withdrawn: {0}")]
    AlreadyWithdrawn(PositionId),

    /// Pool no longer accepts deposits
    #[error("Pool inactive: {0}")]
    PoolInactive(PoolId),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

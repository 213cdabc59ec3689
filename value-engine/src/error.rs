//! Error types for the value engine

use esg_core::AssetId;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Value engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// Asset not found
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// Rejected input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scoring / invoice error
    #[error("Core error: {0}")]
    Core(#[from] esg_core::Error),

    /// Stake ledger error
    #[error("Staking error: {0}")]
    Staking(#[from] staking::Error),

    /// Liquidity ledger error
    #[error("Liquidity error: {0}")]
    Liquidity(#[from] liquidity::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Metrics collection for observability
//!
//! Counters live on a private registry so several engines can coexist in
//! one process.
//!
//! # Metrics
//!
//! - `esg_assets_minted_total` - Assets minted from invoices
//! - `esg_stakes_opened_total` - Stake positions opened
//! - `esg_stakes_settled_total` - Stake positions settled
//! - `esg_liquidity_adds_total` - Liquidity deposits
//! - `esg_liquidity_removals_total` - Liquidity withdrawals
//! - `esg_commit_failures_total` - Ledger commits that failed
//! - `esg_pools_total` - Pools created

use prometheus::{IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Assets minted
    pub assets_minted: IntCounter,

    /// Stakes opened
    pub stakes_opened: IntCounter,

    /// Stakes settled
    pub stakes_settled: IntCounter,

    /// Liquidity deposits
    pub liquidity_adds: IntCounter,

    /// Liquidity withdrawals
    pub liquidity_removals: IntCounter,

    /// Failed ledger commits
    pub commit_failures: IntCounter,

    /// Pools created
    pub pools: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let assets_minted =
            IntCounter::new("esg_assets_minted_total", "Assets minted from invoices")?;
        registry.register(Box::new(assets_minted.clone()))?;

        let stakes_opened = IntCounter::new("esg_stakes_opened_total", "Stake positions opened")?;
        registry.register(Box::new(stakes_opened.clone()))?;

        let stakes_settled =
            IntCounter::new("esg_stakes_settled_total", "Stake positions settled")?;
        registry.register(Box::new(stakes_settled.clone()))?;

        let liquidity_adds = IntCounter::new("esg_liquidity_adds_total", "Liquidity deposits")?;
        registry.register(Box::new(liquidity_adds.clone()))?;

        let liquidity_removals =
            IntCounter::new("esg_liquidity_removals_total", "Liquidity withdrawals")?;
        registry.register(Box::new(liquidity_removals.clone()))?;

        let commit_failures =
            IntCounter::new("esg_commit_failures_total", "Ledger commits that failed")?;
        registry.register(Box::new(commit_failures.clone()))?;

        let pools = IntGauge::new("esg_pools_total", "Pools created")?;
        registry.register(Box::new(pools.clone()))?;

        Ok(Self {
            assets_minted,
            stakes_opened,
            stakes_settled,
            liquidity_adds,
            liquidity_removals,
            commit_failures,
            pools,
            registry,
        })
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("assets_minted", &self.assets_minted.get())
            .field("stakes_opened", &self.stakes_opened.get())
            .field("pools", &self.pools.get())
            .finish_non_exhaustive()
    }
}

//! Typed identifiers and identifier generation
//!
//! Every ledger entity is addressed by its own newtype so that a pool id can
//! never be passed where a stake id is expected. Identifiers are produced by
//! an injected [`IdGenerator`]: [`UuidV7Ids`] in production (time-ordered),
//! [`SequentialIds`] wherever reproducible output matters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap a raw UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0.simple())
            }
        }
    };
}

typed_id!(
    /// ESG asset identifier
    AssetId,
    "ESG_ASSET"
);
typed_id!(
    /// Stake position identifier
    StakeId,
    "STAKE"
);
typed_id!(
    /// Liquidity pool identifier
    PoolId,
    "ESG_POOL"
);
typed_id!(
    /// Liquidity position identifier
    PositionId,
    "POSITION"
);
typed_id!(
    /// Governance vote identifier
    VoteId,
    "VOTE"
);

/// Liquidity holder identifier (opaque, host-assigned)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    /// Create new holder ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce a new, never-before-returned UUID
    fn next_id(&self) -> Uuid;
}

/// Time-ordered UUIDv7 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Monotonic counter identifiers (`00000000-0000-0000-0000-000000000001`, ...)
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting from 1
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(n as u128)
    }
}

use std::sync::atomic::{AtomicU64, Ordering};

use crate::feature::FeatureId;

/// Monotonic identity sequence for one authoritative table.
/// Allocation is lock-free, so it may be shared across workers.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Sequence whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    /// Sequence that starts past every id in `existing`.
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a FeatureId>) -> Self {
        let first = existing.into_iter()
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(1);
        Self::starting_at(first)
    }

    /// Allocate a fresh id. Never returns the same id twice.
    #[inline]
    pub fn allocate(&self) -> FeatureId {
        FeatureId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

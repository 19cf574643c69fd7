//! Completed bundle log
//!
//! Fixed-capacity ring buffer of retired bundles. Inserts are O(1) and
//! always succeed, overwriting the oldest slot once the ring has wrapped.
//!
//! The ring has its own `RwLock`, independent of the active registry.
//! Snapshots return slots in storage order, which is chronological only
//! until the first wrap.

use parking_lot::RwLock;
use strata_qdiag_core::limits::completed_log_capacity;
use strata_qdiag_core::{BundleMetadata, CompletionStatus, Description};
use tracing::trace;

/// Terminal outcome of one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedBundleRecord {
    /// Copy of the bundle's metadata
    pub metadata: BundleMetadata,
    /// Success or Error
    pub status: CompletionStatus,
    /// Outcome description (empty on a plain success)
    pub description: Description,
}

#[derive(Debug)]
struct Ring {
    /// `None` marks a slot that has never been written
    slots: Vec<Option<CompletedBundleRecord>>,
    cursor: usize,
}

/// Fixed-capacity ring of completed bundles
#[derive(Debug)]
pub struct CompletedBundleLog {
    ring: RwLock<Ring>,
}

impl CompletedBundleLog {
    /// Create a log with exactly `capacity` slots (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: RwLock::new(Ring {
                slots: vec![None; capacity],
                cursor: 0,
            }),
        }
    }

    /// Create a log sized from a byte budget
    pub fn with_budget(budget_bytes: usize) -> Self {
        Self::with_capacity(completed_log_capacity(budget_bytes))
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.ring.read().slots.len()
    }

    /// Number of written slots
    pub fn len(&self) -> usize {
        self.ring.read().slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if nothing was ever inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot the next insert will write
    pub fn cursor(&self) -> usize {
        self.ring.read().cursor
    }

    /// Record a retired bundle, overwriting the oldest slot when full
    pub fn insert(
        &self,
        metadata: BundleMetadata,
        status: CompletionStatus,
        description: Description,
    ) {
        let record = CompletedBundleRecord {
            metadata,
            status,
            description,
        };

        let mut ring = self.ring.write();
        let cursor = ring.cursor;
        if let Some(evicted) = ring.slots[cursor].replace(record) {
            trace!(
                query_id = %evicted.metadata.query_id(),
                slot = cursor,
                "Overwrote oldest completed bundle record"
            );
        }
        ring.cursor = (cursor + 1) % ring.slots.len();
    }

    /// Copy of every written slot, in storage order
    pub fn snapshot(&self) -> Vec<CompletedBundleRecord> {
        self.ring.read().slots.iter().flatten().cloned().collect()
    }
}

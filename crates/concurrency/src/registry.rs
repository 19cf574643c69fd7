//! Active bundle registry
//!
//! Concurrent map from [`QueryId`] to the bundle currently capturing it.
//!
//! # Design
//!
//! - One registry-wide `RwLock` guards structural operations only: insert,
//!   remove, and full scans. It is held for the duration of the map
//!   operation and never across I/O.
//! - Entries are reference counted. [`ActiveBundleRegistry::find`] clones an
//!   [`EntryHandle`] under the read lock and releases it, so appends take
//!   only the entry's own mutex.
//! - Capacity is fixed at construction. Activations beyond it fail.
//!
//! # Thread Safety
//!
//! Execution threads of *different* queries contend only on the brief read
//! lock in `find`. Appends to the same bundle serialize on that bundle's
//! accumulator mutex.

use crate::accumulator::{AppendOutcome, BundleAccumulator};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use strata_qdiag_core::{BundleMetadata, Error, QueryId, Result};

/// Shared handle to an active bundle
pub type EntryHandle = Arc<ActiveBundleEntry>;

/// One bundle that is still capturing
#[derive(Debug)]
pub struct ActiveBundleEntry {
    metadata: BundleMetadata,
    accumulator: BundleAccumulator,
}

impl ActiveBundleEntry {
    /// Create an entry with an empty accumulator of `bind_vars_capacity` bytes
    pub fn new(metadata: BundleMetadata, bind_vars_capacity: usize) -> Self {
        Self {
            metadata,
            accumulator: BundleAccumulator::new(bind_vars_capacity),
        }
    }

    /// Bundle metadata
    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    /// Bind-variable buffer
    pub fn accumulator(&self) -> &BundleAccumulator {
        &self.accumulator
    }

    /// Append one formatted execution line under the entry lock
    pub fn append(&self, line: &str) -> AppendOutcome {
        self.accumulator.append(line)
    }

    /// Copy out metadata and accumulated data, sealing the buffer.
    ///
    /// Returns `None` if the bundle was already extracted, so a bundle is
    /// retired at most once even if two passes overlap.
    pub fn try_extract(&self) -> Option<ExtractedBundle> {
        self.accumulator.take_once().map(|data| ExtractedBundle {
            metadata: self.metadata.clone(),
            data,
        })
    }
}

/// Owned copy of an expired bundle, safe to persist with no lock held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBundle {
    /// Bundle metadata
    pub metadata: BundleMetadata,
    /// Accumulated bind-variable CSV
    pub data: String,
}

/// Concurrent map of active bundles with a fixed capacity
pub struct ActiveBundleRegistry {
    entries: RwLock<FxHashMap<QueryId, EntryHandle>>,
    max_entries: usize,
    bind_vars_capacity: usize,
}

impl ActiveBundleRegistry {
    /// Create a registry holding at most `max_entries` bundles, each with a
    /// `bind_vars_capacity` byte buffer.
    pub fn new(max_entries: usize, bind_vars_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::with_capacity_and_hasher(
                max_entries,
                Default::default(),
            )),
            max_entries,
            bind_vars_capacity,
        }
    }

    /// Maximum number of simultaneously active bundles
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Per-bundle buffer capacity in bytes
    pub fn bind_vars_capacity(&self) -> usize {
        self.bind_vars_capacity
    }

    /// Number of active bundles
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if no bundle is active
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert a new bundle.
    ///
    /// Fails without side effects with [`Error::DuplicateBundle`] if the
    /// query already has an active bundle, or [`Error::Capacity`] if the
    /// registry is full. A duplicate is reported even when the registry is
    /// also full.
    pub fn activate(&self, metadata: BundleMetadata) -> Result<EntryHandle> {
        let query_id = metadata.query_id();
        let entry = Arc::new(ActiveBundleEntry::new(metadata, self.bind_vars_capacity));

        let mut entries = self.entries.write();
        if entries.contains_key(&query_id) {
            return Err(Error::DuplicateBundle { query_id });
        }
        if entries.len() >= self.max_entries {
            return Err(Error::Capacity {
                limit: self.max_entries,
            });
        }
        entries.insert(query_id, Arc::clone(&entry));
        Ok(entry)
    }

    /// Look up the active bundle for `query_id`.
    ///
    /// The registry lock is released before this returns.
    #[inline]
    pub fn find(&self, query_id: QueryId) -> Option<EntryHandle> {
        self.entries.read().get(&query_id).cloned()
    }

    /// Check if `query_id` has an active bundle
    pub fn contains(&self, query_id: QueryId) -> bool {
        self.entries.read().contains_key(&query_id)
    }

    /// Metadata of every active bundle, in unspecified order
    pub fn snapshot_all(&self) -> Vec<BundleMetadata> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.metadata.clone())
            .collect()
    }

    /// Extract every bundle expired at `now`.
    ///
    /// One O(n) scan under the read lock. Each expired entry is copied out
    /// under its own lock (registry lock, then entry lock) and sealed. The
    /// entries stay registered until [`remove`](Self::remove); the returned
    /// copies own everything needed to persist them with no lock held.
    pub fn extract_expired(&self, now: DateTime<Utc>) -> Vec<ExtractedBundle> {
        self.entries
            .read()
            .values()
            .filter(|entry| entry.metadata.is_expired_at(now))
            .filter_map(|entry| entry.try_extract())
            .collect()
    }

    /// Remove the bundle for `query_id`, returning it if present
    pub fn remove(&self, query_id: QueryId) -> Option<EntryHandle> {
        self.entries.write().remove(&query_id)
    }
}

impl std::fmt::Debug for ActiveBundleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveBundleRegistry")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("bind_vars_capacity", &self.bind_vars_capacity)
            .finish()
    }
}

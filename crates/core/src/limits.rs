//! Fixed capacities and size accounting
//!
//! All limits are applied once, when the diagnostics context is built, and
//! never resized afterwards.

/// Default maximum number of simultaneously active bundles.
pub const DEFAULT_MAX_ACTIVE_BUNDLES: usize = 100;

/// Default per-bundle bind-variable buffer capacity in bytes.
///
/// Accumulated text always stays strictly shorter than the capacity.
pub const DEFAULT_BIND_VARS_CAPACITY: usize = 2048;

/// Size of a description slot. Stored descriptions hold at most
/// `DESCRIPTION_LEN - 1` bytes.
pub const DESCRIPTION_LEN: usize = 128;

/// Maximum length (exclusive) of a bundle output path in bytes.
pub const MAX_PATH_LEN: usize = 1024;

/// Accounting size of one completed-log slot: path bound, description
/// bound, and the fixed-width parameter and status fields.
pub const COMPLETED_RECORD_SIZE: usize = MAX_PATH_LEN + DESCRIPTION_LEN + 64;

/// Default completed-log byte budget (64 KiB).
pub const DEFAULT_COMPLETED_LOG_BUDGET_BYTES: usize = 64 * 1024;

/// Default reaper tick in milliseconds.
pub const DEFAULT_BG_WORKER_INTERVAL_MS: u64 = 1000;

/// Number of completed-log slots a byte budget buys. Never less than one.
pub fn completed_log_capacity(budget_bytes: usize) -> usize {
    (budget_bytes / COMPLETED_RECORD_SIZE).max(1)
}

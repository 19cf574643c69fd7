//! Concurrency layer for query diagnostics
//!
//! This crate holds every piece of diagnostics state that is shared between
//! query execution threads and the background reaper:
//! - BundleAccumulator: bounded per-bundle bind-variable buffer
//! - ActiveBundleRegistry: query id -> active bundle map
//! - CompletedBundleLog: fixed-capacity ring of retired bundles
//!
//! ## Lock Order
//!
//! ```text
//! registry RwLock ──┐
//!                   ├──> entry Mutex
//! completed RwLock ─┘
//! ```
//!
//! The two collection locks are never held together, and none of the locks
//! is ever held across disk I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accumulator;
pub mod completed;
pub mod registry;

pub use accumulator::{format_execution, AppendOutcome, BundleAccumulator};
pub use completed::{CompletedBundleLog, CompletedBundleRecord};
pub use registry::{ActiveBundleEntry, ActiveBundleRegistry, EntryHandle, ExtractedBundle};

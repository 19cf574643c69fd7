//! Query diagnostics engine
//!
//! Ties the diagnostics layers together:
//! - Config: sizing and feature gate, loaded from TOML
//! - Engine: activation and the execution-end hook
//! - Reaper: retires expired bundles on a background thread
//! - Status: one row per active and completed bundle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod reaper;
pub mod status;

pub use config::{ConfigError, DiagnosticsConfig};
pub use engine::DiagnosticsEngine;
pub use reaper::{ExpiryReaper, ReapSummary, ReaperHandle, REAPER_THREAD_NAME};
pub use status::{StatusReporter, StatusRow};

//! Convenient imports for query diagnostics.
//!
//! ```ignore
//! use strata_qdiag::prelude::*;
//!
//! let qd = QueryDiagnostics::open("./data")?;
//! qd.activate(&ActivationRequest::new(42))?;
//! ```

// Main entry point
pub use crate::diagnostics::{QueryDiagnostics, QueryDiagnosticsBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Activation and hook types
pub use crate::types::{ActivationRequest, AppendOutcome, BindValue, QueryId};

// Reporting
pub use crate::types::{BundleStatus, ReapSummary, StatusRow};

// Configuration
pub use crate::types::DiagnosticsConfig;

// Re-export serde_json for convenience
pub use serde_json::json;

//! # Strata Query Diagnostics
//!
//! Time-boxed capture of bind variables for a single normalized query.
//!
//! A caller activates a diagnostics bundle for a query id. For the
//! bundle's interval, every execution of that query that runs at least the
//! configured threshold appends its bind values and elapsed time to the
//! bundle. When the interval ends a background reaper writes the data to
//! `<data_root>/query-diagnostics/<query_id>/<n>/bind_variables.csv` and
//! records the outcome.
//!
//! ## Quick Start
//!
//! ```ignore
//! use strata_qdiag::prelude::*;
//!
//! let qd = QueryDiagnostics::open("/var/lib/strata")?;
//!
//! let path = qd.activate(&ActivationRequest::new(42).interval_sec(60))?;
//!
//! // Executor hook, once per finished query
//! qd.on_execution_end(42, elapsed, &[BindValue::Int(7)]);
//!
//! // Active bundles first, then completed ones
//! for row in qd.status()? {
//!     println!("{} {}", row.query_id, row.status);
//! }
//!
//! qd.close()?;
//! ```
//!
//! ## Layers
//!
//! - `strata-qdiag-core` - ids, parameters, metadata, bind values
//! - `strata-qdiag-concurrency` - registry, accumulators, completed log
//! - `strata-qdiag-durability` - bundle paths and file output
//! - `strata-qdiag-engine` - activation, hook, reaper, status

#![warn(missing_docs)]

mod diagnostics;
mod error;
mod types;

pub mod prelude;

// Re-export main entry points
pub use diagnostics::{QueryDiagnostics, QueryDiagnosticsBuilder};
pub use error::{Error, Result};

// Re-export types
pub use types::*;

//! Durability layer for query diagnostics
//!
//! This crate turns an expired bundle into files on disk:
//! - Path: Deterministic bundle directory under the data root
//! - Persist: Write accumulated bind variables, report the outcome
//!
//! ## On-disk Layout
//!
//! ```text
//! <data_root>/
//!   query-diagnostics/
//!     <query_id>/
//!       <disambiguator>/
//!         bind_variables.csv
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod path;
pub mod persist;

pub use path::{bundle_path, disambiguator, BIND_VARIABLES_FILE, DIAGNOSTICS_DIR};
pub use persist::{
    persist, try_persist, PersistError, PersistOutcome, Persisted, NO_DATA_CAPTURED,
};

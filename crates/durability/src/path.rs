//! Bundle output paths
//!
//! A bundle directory is `<data_root>/query-diagnostics/<query_id>/<n>/`,
//! where `n` is derived from the activation start time. Repeated
//! activations of the same query therefore land in different directories.

use chrono::{DateTime, Utc};
use std::path::{Path, MAIN_SEPARATOR};
use strata_qdiag_core::limits::MAX_PATH_LEN;
use strata_qdiag_core::{Error, QueryId, Result};
use xxhash_rust::xxh3::xxh3_64;

/// Directory under the data root holding all bundles
pub const DIAGNOSTICS_DIR: &str = "query-diagnostics";

/// File holding a bundle's accumulated bind variables
pub const BIND_VARIABLES_FILE: &str = "bind_variables.csv";

/// Pseudo-random directory name derived from the start time.
///
/// Low 32 bits of the xxh3 hash of the start time in microseconds.
pub fn disambiguator(start_time: DateTime<Utc>) -> u32 {
    xxh3_64(&start_time.timestamp_micros().to_le_bytes()) as u32
}

/// Derive the bundle directory, with a trailing separator.
///
/// # Errors
///
/// [`Error::PathConstruction`] if the path is `MAX_PATH_LEN` bytes or
/// longer.
pub fn bundle_path(
    data_root: &Path,
    query_id: QueryId,
    start_time: DateTime<Utc>,
) -> Result<String> {
    let dir = data_root
        .join(DIAGNOSTICS_DIR)
        .join(query_id.to_string())
        .join(disambiguator(start_time).to_string());

    let mut path = dir.to_string_lossy().into_owned();
    path.push(MAIN_SEPARATOR);

    if path.len() >= MAX_PATH_LEN {
        return Err(Error::PathConstruction {
            length: path.len(),
            limit: MAX_PATH_LEN,
        });
    }
    Ok(path)
}

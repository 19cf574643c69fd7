//! Bundle persistence
//!
//! Writes one extracted bundle to its output directory. Runs on the reaper
//! with no shared lock held; a slow or failing disk delays only the reaper.
//!
//! ## Outcomes
//!
//! | Situation | Status | Description |
//! |-----------|--------|-------------|
//! | No data accumulated | Success | "No data captured" (no I/O performed) |
//! | Data written | Success | empty |
//! | Directory, open or write failure | Error | error text |
//!
//! Failures are values, never panics: [`try_persist`] returns a `Result`
//! for callers that want to inspect the error, [`persist`] folds it into a
//! [`PersistOutcome`].

use crate::path::BIND_VARIABLES_FILE;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use strata_qdiag_core::{CompletionStatus, Description};
use thiserror::Error;
use tracing::debug;

/// Description recorded for a bundle that captured nothing
pub const NO_DATA_CAPTURED: &str = "No data captured";

/// Why a bundle could not be written
#[derive(Debug, Error)]
pub enum PersistError {
    /// Directory creation failed for a reason other than "already exists"
    #[error("Failed to create query diagnostics directory: {source}")]
    CreateDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The output file could not be created or truncated
    #[error("Failed to open bind_variables.csv: {source}")]
    CreateFile {
        /// File that could not be opened
        file: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Writing the data failed
    #[error("Error writing to file; {source}")]
    Write {
        /// File being written
        file: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

/// What a successful persist did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// Nothing was accumulated; nothing was written
    NoData,
    /// Data was written in full
    Written {
        /// Bytes written
        bytes: usize,
    },
}

/// Terminal status and description of one persist attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    /// Success or Error
    pub status: CompletionStatus,
    /// Outcome text
    pub description: Description,
}

impl PersistOutcome {
    /// Fold a persist result into a status and bounded description
    pub fn from_result(result: &Result<Persisted, PersistError>) -> Self {
        match result {
            Ok(Persisted::NoData) => PersistOutcome {
                status: CompletionStatus::Success,
                description: Description::new(NO_DATA_CAPTURED),
            },
            Ok(Persisted::Written { .. }) => PersistOutcome {
                status: CompletionStatus::Success,
                description: Description::empty(),
            },
            Err(e) => PersistOutcome {
                status: CompletionStatus::Error,
                description: Description::new(e.to_string()),
            },
        }
    }
}

/// Write `data` to `<output_path>/bind_variables.csv`.
///
/// Empty data performs no I/O. Otherwise the directory is created
/// recursively (an existing directory is fine) and the file is created or
/// truncated and written in full.
pub fn try_persist(output_path: impl AsRef<Path>, data: &str) -> Result<Persisted, PersistError> {
    if data.is_empty() {
        return Ok(Persisted::NoData);
    }

    let dir = output_path.as_ref();
    ensure_dir(dir)?;

    let file = dir.join(BIND_VARIABLES_FILE);
    let mut handle = File::create(&file).map_err(|source| PersistError::CreateFile {
        file: file.clone(),
        source,
    })?;
    handle
        .write_all(data.as_bytes())
        .and_then(|_| handle.flush())
        .map_err(|source| PersistError::Write {
            file: file.clone(),
            source,
        })?;

    debug!(file = %file.display(), bytes = data.len(), "Wrote diagnostics bundle");
    Ok(Persisted::Written { bytes: data.len() })
}

/// Write `data` and report the outcome as a status and description.
pub fn persist(output_path: impl AsRef<Path>, data: &str) -> PersistOutcome {
    PersistOutcome::from_result(&try_persist(output_path, data))
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(PersistError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

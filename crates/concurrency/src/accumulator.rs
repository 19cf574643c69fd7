//! Bounded bind-variable accumulation
//!
//! Every active bundle owns one [`BundleAccumulator`]. Execution threads
//! append one line per qualifying execution; the reaper takes the whole
//! buffer exactly once when the bundle expires.
//!
//! # Overflow Policy
//!
//! The buffer never grows past its capacity: accumulated text is always
//! strictly shorter than `capacity` bytes. A line that does not fit in the
//! remaining space is dropped whole, so the buffer only ever contains
//! complete lines. Dropping is silent to the caller; the returned
//! [`AppendOutcome`] exists for instrumentation, not error handling.
//!
//! # Locking
//!
//! Each accumulator has its own mutex, independent of the registry lock.
//! Lines are formatted by [`format_execution`] before the mutex is taken;
//! the critical section is a bounds check and a `memcpy`.

use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;
use strata_qdiag_core::BindValue;

/// Result of one append attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The line was copied in
    Appended,
    /// The line did not fit and was dropped
    Full,
    /// The buffer was already taken by the reaper; the line was dropped
    Sealed,
}

#[derive(Debug)]
struct AccumulatorState {
    text: String,
    sealed: bool,
}

/// Bounded append-only text buffer for one active bundle
#[derive(Debug)]
pub struct BundleAccumulator {
    capacity: usize,
    state: Mutex<AccumulatorState>,
}

impl BundleAccumulator {
    /// Create an accumulator holding at most `capacity - 1` bytes.
    ///
    /// The full capacity is reserved up front so appends never reallocate
    /// while the mutex is held.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(AccumulatorState {
                text: String::with_capacity(capacity),
                sealed: false,
            }),
        }
    }

    /// Configured capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes accumulated so far
    pub fn len(&self) -> usize {
        self.state.lock().text.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.state.lock().text.is_empty()
    }

    /// Check if no further byte can be accepted.
    ///
    /// Execution threads use this to skip formatting entirely once the
    /// buffer is exhausted.
    pub fn is_full(&self) -> bool {
        let state = self.state.lock();
        state.sealed || state.text.len() + 1 >= self.capacity
    }

    /// Check if the reaper has already taken this buffer
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Append one pre-formatted unit if it fits entirely
    pub fn append(&self, unit: &str) -> AppendOutcome {
        let mut state = self.state.lock();
        if state.sealed {
            return AppendOutcome::Sealed;
        }
        if state.text.len() + unit.len() >= self.capacity {
            return AppendOutcome::Full;
        }
        state.text.push_str(unit);
        AppendOutcome::Appended
    }

    /// Copy of the current contents
    pub fn contents(&self) -> String {
        self.state.lock().text.clone()
    }

    /// Take the accumulated text and seal the buffer.
    ///
    /// Returns `None` if the buffer was already taken. After the first call
    /// every further append is dropped with [`AppendOutcome::Sealed`]; an
    /// append racing with this call either lands entirely before the take
    /// or is dropped entirely.
    pub fn take_once(&self) -> Option<String> {
        let mut state = self.state.lock();
        if state.sealed {
            return None;
        }
        state.sealed = true;
        Some(std::mem::take(&mut state.text))
    }
}

/// Render one execution as an appendable CSV line.
///
/// Each parameter is written in its text form followed by a comma, then the
/// elapsed time in milliseconds with six decimals, then a newline:
/// `7,3.500000\n`.
pub fn format_execution(params: &[BindValue], elapsed: Duration) -> String {
    let mut line = String::with_capacity(16 * (params.len() + 1));
    for param in params {
        param.write_text(&mut line);
        line.push(',');
    }
    let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
    // Writing into a String cannot fail
    let _ = writeln!(line, "{:.6}", elapsed_ms);
    line
}

//! Bind parameter values
//!
//! A [`BindValue`] is one bound parameter of a finished query execution, as
//! handed to the execution-end hook. Only its textual output form matters to
//! diagnostics; it is written into the bundle's bind-variable CSV.
//!
//! ## Text Forms
//!
//! | Variant | Output |
//! |---------|--------|
//! | `Null` | `NULL` |
//! | `Bool` | `t` / `f` |
//! | `Int` | decimal |
//! | `Float` | shortest round-trip, `NaN`, `Infinity`, `-Infinity` |
//! | `Text` | verbatim |
//! | `Bytes` | `\x` followed by lowercase hex |

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// One bound parameter of a query execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit IEEE-754 float
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl BindValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }

    /// Append the text form of this value to `out`
    pub fn write_text(&self, out: &mut String) {
        // Writing into a String cannot fail
        let _ = write!(out, "{}", self);
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => f.write_str("NULL"),
            BindValue::Bool(true) => f.write_str("t"),
            BindValue::Bool(false) => f.write_str("f"),
            BindValue::Int(i) => write!(f, "{}", i),
            BindValue::Float(x) if x.is_nan() => f.write_str("NaN"),
            BindValue::Float(x) if *x == f64::INFINITY => f.write_str("Infinity"),
            BindValue::Float(x) if *x == f64::NEG_INFINITY => f.write_str("-Infinity"),
            BindValue::Float(x) => write!(f, "{}", x),
            BindValue::Text(s) => f.write_str(s),
            BindValue::Bytes(bytes) => {
                f.write_str("\\x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl From<i64> for BindValue {
    fn from(i: i64) -> Self {
        BindValue::Int(i)
    }
}

impl From<f64> for BindValue {
    fn from(x: f64) -> Self {
        BindValue::Float(x)
    }
}

impl From<bool> for BindValue {
    fn from(b: bool) -> Self {
        BindValue::Bool(b)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(BindValue::Null, Into::into)
    }
}

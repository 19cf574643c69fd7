//! Core types for Strata query diagnostics
//!
//! This crate defines the fundamental types shared by every diagnostics layer:
//! - [`QueryId`]: Identifier of a normalized query
//! - [`DiagnosticsParams`]: Validated activation parameters
//! - [`BundleMetadata`]: Immutable description of one diagnostics bundle
//! - [`BundleStatus`] / [`CompletionStatus`]: Bundle outcome labels
//! - [`Description`]: Bounded outcome text
//! - [`BindValue`]: One bound parameter of a query execution

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{
    BundleMetadata, BundleStatus, CompletionStatus, Description, DiagnosticsParams,
    DiagnosticsParamsBuilder, QueryId,
};
pub use value::BindValue;

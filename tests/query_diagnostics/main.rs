//! Query Diagnostics Integration Tests
//!
//! End-to-end tests through the public `QueryDiagnostics` facade:
//! activation, the execution hook, expiry, status and concurrency.

#[path = "../common/mod.rs"]
mod common;

mod execution_hook;
mod expiry;

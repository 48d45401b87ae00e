//! Quota-gated scan decision flow.
//!
//! The engine picks a strategy from the user's tier (free -> Basic, Pro ->
//! Deep), enforces the daily free-tier quota against the scan log, classifies
//! the URL, and appends an immutable audit record.

pub mod classify;
pub mod engine;
pub mod log_store;
pub mod policy;

pub use classify::{classify, Verdict};
pub use engine::{ScanEngine, ScanOutcome};
pub use log_store::{RedbScanLogs, ScanLogStore};
pub use policy::ScanPolicy;

use serde::{Deserialize, Serialize};

/// Verdict status of a completed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanStatus {
    Safe,
    Suspicious,
    Dangerous,
}

/// Scan strategy, selected by tier: free users get Basic, Pro users get Deep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanType {
    Basic,
    Deep,
}

/// Scan audit record stored in redb
///
/// Append-only: once written a record is never mutated or deleted, even when
/// the owning account is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanLogRecord {
    pub user_id: String,
    /// The URL exactly as submitted; no normalization is applied
    pub url: String,
    pub result: ScanStatus,
    pub scan_type: ScanType,
    /// Human-readable explanation shown to the user
    pub details: String,
    /// Server-assigned creation time (Unix millis)
    pub created_at: i64,
}

/// Scan log entry with its store-assigned identifier
#[derive(Debug, Clone, Serialize)]
pub struct ScanLog {
    pub id: String,
    #[serde(flatten)]
    pub record: ScanLogRecord,
}

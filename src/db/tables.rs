use redb::TableDefinition;

/// Users table: user_id (UUID v4 string) -> UserRecord (serialized)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: lowercased email -> user_id
/// Enforces registration uniqueness and backs login lookups
pub const USERS_BY_EMAIL: TableDefinition<&str, &str> = TableDefinition::new("users_by_email");

/// Scan logs table: log_id (UUID v4 string) -> ScanLogRecord (serialized)
/// Append-only audit trail; entries are never updated or removed
pub const SCAN_LOGS: TableDefinition<&str, &[u8]> = TableDefinition::new("scan_logs");

/// Quota index: user_id -> Vec<i64> of scan timestamps (Unix millis)
/// Written in the same transaction as the SCAN_LOGS insert
pub const USER_SCANS: TableDefinition<&str, &[u8]> = TableDefinition::new("user_scans");

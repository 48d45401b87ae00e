/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted URL length for a scan request
/// Anything longer is almost certainly garbage and would bloat the audit log
pub const MAX_URL_LEN: usize = 4096;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message when the scan request carries no URL
pub const ERR_URL_REQUIRED: &str = "URL is required";

/// Error message for an email that fails basic format checks
pub const ERR_INVALID_EMAIL: &str = "Invalid email address";

/// Error message for a too-short password
pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";

/// Message returned with a 429 when the daily free-tier quota is spent
pub const MSG_QUOTA_EXCEEDED: &str =
    "Daily scan limit reached. Upgrade to Pro for unlimited AI scans.";

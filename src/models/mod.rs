pub mod scan_log;
pub mod user;

pub use scan_log::{ScanLog, ScanLogRecord, ScanStatus, ScanType};
pub use user::{PaymentEntry, UserProfile, UserRecord};

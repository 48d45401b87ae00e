use std::sync::Arc;

use serde::Serialize;

use crate::clock::Clock;
use crate::constants::{ERR_URL_REQUIRED, MAX_URL_LEN};
use crate::error::{AppError, Result};
use crate::models::{ScanLogRecord, ScanStatus, ScanType};
use crate::scan::classify::classify;
use crate::scan::log_store::ScanLogStore;
use crate::scan::policy::ScanPolicy;

/// Result of a permitted scan, returned to the caller after the audit record
/// has been persisted
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub url: String,
    pub status: ScanStatus,
    pub message: &'static str,
    #[serde(rename = "scanType")]
    pub scan_type: ScanType,
}

/// Scan decision engine.
///
/// Stateless: selects the strategy from the user's tier, enforces the daily
/// quota for free users, classifies, and persists exactly one audit record
/// per permitted scan. The count-then-append pair is not atomic; concurrent
/// requests from the same user can race past the quota check, which is an
/// accepted relaxation (quota is advisory, not a security boundary).
pub struct ScanEngine {
    logs: Arc<dyn ScanLogStore>,
    clock: Arc<dyn Clock>,
    policy: ScanPolicy,
}

impl ScanEngine {
    pub fn new(logs: Arc<dyn ScanLogStore>, clock: Arc<dyn Clock>, policy: ScanPolicy) -> Self {
        Self {
            logs,
            clock,
            policy,
        }
    }

    /// Run one scan for the given user.
    ///
    /// Quota rejections and invalid input leave no trace in the audit log;
    /// an append failure aborts the request even though a verdict was
    /// already computed.
    pub async fn scan(&self, user_id: &str, is_pro: bool, url: &str) -> Result<ScanOutcome> {
        if url.is_empty() {
            return Err(AppError::InvalidInput(ERR_URL_REQUIRED.to_string()));
        }
        if url.len() > MAX_URL_LEN {
            return Err(AppError::InvalidInput("URL too long".to_string()));
        }

        let now = self.clock.now();

        let scan_type = if is_pro {
            // Pro users are unconditionally exempt from rate limiting
            ScanType::Deep
        } else {
            let since = self.policy.day_start_millis(now);
            let count = match self.logs.count_since(user_id, since).await {
                Ok(n) => n,
                Err(e) => {
                    // Fail open: a storage fault must not lock a legitimate
                    // user out of scanning
                    tracing::warn!("Scan count query failed, treating as 0: {}", e);
                    0
                }
            };

            if !self.policy.permits(count) {
                tracing::info!("Daily quota reached for user {}: {} scans", user_id, count);
                return Err(AppError::QuotaExceeded);
            }

            ScanType::Basic
        };

        let verdict = classify(url, scan_type);

        // Fail closed: no verdict is returned if the audit record cannot be
        // written
        self.logs
            .append(ScanLogRecord {
                user_id: user_id.to_string(),
                url: url.to_string(),
                result: verdict.status,
                scan_type,
                details: verdict.message.to_string(),
                created_at: now.timestamp_millis(),
            })
            .await?;

        Ok(ScanOutcome {
            url: url.to_string(),
            status: verdict.status,
            message: verdict.message,
            scan_type,
        })
    }
}

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, Utc};

/// Free-tier rate-limit policy: a fixed number of Basic scans per calendar
/// day, with the day boundary taken at midnight in a fixed UTC offset.
///
/// This is a day boundary, not a rolling 24-hour window: a scan logged at
/// 23:59:59 stops counting one second later.
#[derive(Debug, Clone, Copy)]
pub struct ScanPolicy {
    quota_per_day: u32,
    offset: FixedOffset,
}

impl ScanPolicy {
    /// Build a policy. `utc_offset_minutes` outside +/-24h is treated as UTC.
    pub fn new(quota_per_day: u32, utc_offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
        Self {
            quota_per_day,
            offset,
        }
    }

    /// Start of "today" (00:00:00.000 in the policy's offset) as Unix millis
    pub fn day_start_millis(&self, now: DateTime<Utc>) -> i64 {
        let local = now.with_timezone(&self.offset);
        let midnight = local.date_naive().and_time(NaiveTime::MIN);
        // Fixed offsets have no DST gaps, so the local timestamp is unambiguous
        midnight
            .and_local_timezone(self.offset)
            .single()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| now.timestamp_millis())
    }

    /// Whether a user who has already logged `count` scans today may scan again
    pub fn permits(&self, count: u64) -> bool {
        count < self.quota_per_day as u64
    }
}

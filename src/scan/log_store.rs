use async_trait::async_trait;
use redb::ReadableTable;
use uuid::Uuid;

use crate::db::{tables, Db};
use crate::error::Result;
use crate::models::{ScanLog, ScanLogRecord};

/// Persistence seam for scan audit records.
///
/// The engine only appends and counts; it never reads individual entries
/// back. Tests swap in an in-memory implementation to exercise storage
/// failure paths.
#[async_trait]
pub trait ScanLogStore: Send + Sync {
    /// Append an immutable audit record, returning it with its assigned id.
    ///
    /// Failures here must propagate: a scan whose audit record cannot be
    /// written is reported as failed (fail-closed).
    async fn append(&self, record: ScanLogRecord) -> Result<ScanLog>;

    /// Number of entries for `user_id` with `created_at >= since_millis`.
    ///
    /// Callers decide what a storage error means; the quota policy layer
    /// coerces errors to zero (fail-open) so a store fault never blocks a
    /// legitimate user.
    async fn count_since(&self, user_id: &str, since_millis: i64) -> Result<u64>;
}

/// redb-backed scan log store
///
/// Log records are keyed by a fresh UUID; the per-user quota index keeps the
/// creation timestamps so counting does not deserialize full records.
pub struct RedbScanLogs {
    db: Db,
}

/// Quota index entries older than this are dropped on append. The quota
/// window is one calendar day in a fixed offset of at most +-24h, so its
/// start is never more than 48h behind the entry being written.
const INDEX_RETENTION_MS: i64 = 48 * 60 * 60 * 1000;

impl RedbScanLogs {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScanLogStore for RedbScanLogs {
    async fn append(&self, record: ScanLogRecord) -> Result<ScanLog> {
        let db = self.db.clone();

        tokio::task::spawn_blocking(move || -> Result<ScanLog> {
            let id = Uuid::new_v4().to_string();
            let bytes = bincode::serialize(&record)?;

            let write_txn = db.begin_write()?;
            {
                let mut logs = write_txn.open_table(tables::SCAN_LOGS)?;
                logs.insert(id.as_str(), bytes.as_slice())?;
                drop(logs);

                // Keep the quota index in the same transaction so a count can
                // never observe a log entry without its timestamp
                let mut index = write_txn.open_table(tables::USER_SCANS)?;
                let mut stamps: Vec<i64> = match index.get(record.user_id.as_str())? {
                    Some(bytes) => bincode::deserialize(bytes.value())?,
                    None => Vec::new(),
                };
                stamps.retain(|&t| t >= record.created_at - INDEX_RETENTION_MS);
                stamps.push(record.created_at);
                let stamp_bytes = bincode::serialize(&stamps)?;
                index.insert(record.user_id.as_str(), stamp_bytes.as_slice())?;
            }
            write_txn.commit()?;

            Ok(ScanLog { id, record })
        })
        .await?
    }

    async fn count_since(&self, user_id: &str, since_millis: i64) -> Result<u64> {
        let db = self.db.clone();
        let user_id = user_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<u64> {
            let read_txn = db.begin_read()?;
            let index = read_txn.open_table(tables::USER_SCANS)?;

            let count = match index.get(user_id.as_str())? {
                Some(bytes) => {
                    let stamps: Vec<i64> = bincode::deserialize(bytes.value())?;
                    stamps.iter().filter(|&&t| t >= since_millis).count() as u64
                }
                None => 0,
            };

            Ok(count)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use crate::models::{ScanStatus, ScanType};
    use tempfile::TempDir;

    fn record_at(user_id: &str, created_at: i64) -> ScanLogRecord {
        ScanLogRecord {
            user_id: user_id.to_string(),
            url: "https://example.com".to_string(),
            result: ScanStatus::Safe,
            scan_type: ScanType::Basic,
            details: "Basic check passed (Blacklist check only).".to_string(),
            created_at,
        }
    }

    fn open_test_store() -> (RedbScanLogs, TempDir) {
        let temp = TempDir::new().unwrap();
        let db = open_database(temp.path().join("scans.redb")).unwrap();
        (RedbScanLogs::new(db), temp)
    }

    #[tokio::test]
    async fn append_drops_index_entries_older_than_retention() {
        let (store, _temp) = open_test_store();
        let t0 = 1_700_000_000_000_i64;

        store.append(record_at("u1", t0)).await.unwrap();
        store
            .append(record_at("u1", t0 + 3 * 24 * 60 * 60 * 1000))
            .await
            .unwrap();

        // The first stamp is past retention; only the fresh one remains.
        assert_eq!(store.count_since("u1", 0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn append_keeps_index_entries_inside_retention() {
        let (store, _temp) = open_test_store();
        let t0 = 1_700_000_000_000_i64;

        store.append(record_at("u1", t0)).await.unwrap();
        store.append(record_at("u1", t0 + 60_000)).await.unwrap();

        assert_eq!(store.count_since("u1", 0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn append_surfaces_corrupt_quota_index() {
        let (store, _temp) = open_test_store();

        // Plant bytes that do not decode as a Vec<i64>.
        let write_txn = store.db.begin_write().unwrap();
        {
            let mut index = write_txn.open_table(tables::USER_SCANS).unwrap();
            index.insert("u1", [0xff_u8, 0x01].as_slice()).unwrap();
        }
        write_txn.commit().unwrap();

        let err = store.append(record_at("u1", 1_700_000_000_000)).await;
        assert!(err.is_err());
    }
}

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::db::tables;
use crate::error::Result;
use crate::AppState;

/// Liveness probe for monitoring and the extension client's first-run check.
///
/// Opens the `users` and `scan_logs` tables instead of only starting a read
/// transaction: a half-initialized store would pass the weaker check and
/// then fail every login and scan.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.clone();
    let store_status = tokio::task::spawn_blocking(move || {
        let probe = || -> Result<()> {
            let read_txn = db.begin_read()?;
            read_txn.open_table(tables::USERS)?;
            read_txn.open_table(tables::SCAN_LOGS)?;
            Ok(())
        };
        match probe() {
            Ok(()) => "reachable",
            Err(e) => {
                tracing::error!("Store health check failed: {}", e);
                "unreachable"
            }
        }
    })
    .await
    .unwrap_or("error");

    Json(json!({
        "status": if store_status == "reachable" { "ok" } else { "degraded" },
        "store": store_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

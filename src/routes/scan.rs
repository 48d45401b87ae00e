use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::constants::ERR_URL_REQUIRED;
use crate::error::{AppError, Result};
use crate::routes::user::load_user;
use crate::scan::{RedbScanLogs, ScanEngine, ScanOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /api/scan/link
///
/// The quota-gated scan flow: resolve the caller, let the decision engine
/// pick the strategy and enforce the free-tier quota, and return the verdict.
/// The engine persists one audit record per permitted scan.
pub async fn scan_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>> {
    let url = payload
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::InvalidInput(ERR_URL_REQUIRED.to_string()))?;

    // Tier lookup precedes everything; a stale token for a deleted account
    // gets a 404 here
    let user = load_user(state.db.clone(), auth.user_id.clone()).await?;

    let engine = ScanEngine::new(
        Arc::new(RedbScanLogs::new(state.db.clone())),
        state.clock.clone(),
        state.config.scan_policy(),
    );

    let outcome = engine.scan(&auth.user_id, user.is_pro, &url).await?;

    tracing::info!(
        "Scan for user {}: {:?} ({:?})",
        auth.user_id,
        outcome.status,
        outcome.scan_type
    );

    Ok(Json(outcome))
}

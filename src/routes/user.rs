use axum::{extract::State, Json};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::constants::{ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN};
use crate::db::{tables, Db};
use crate::error::{AppError, Result};
use crate::models::{UserProfile, UserRecord};
use crate::security::{hash_password, verify_password};
use crate::AppState;

/// Load a user record, mapping a missing row to `UserNotFound`.
///
/// Shared by every authenticated handler: a valid token's account may have
/// been deleted since the token was issued.
pub(crate) async fn load_user(db: Db, user_id: String) -> Result<UserRecord> {
    tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;

        users
            .get(user_id.as_str())?
            .map(|b| bincode::deserialize::<UserRecord>(b.value()))
            .transpose()?
            .ok_or(AppError::UserNotFound)
    })
    .await?
}

/// Persist a full user record (records are small, so updates rewrite them)
pub(crate) async fn store_user(db: Db, user_id: String, record: UserRecord) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let bytes = bincode::serialize(&record)?;
            users.insert(user_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await?
}

/// GET /api/user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>> {
    let record = load_user(state.db.clone(), auth.user_id.clone()).await?;
    Ok(Json(UserProfile::from_record(&auth.user_id, &record)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: UserProfile,
}

/// PUT /api/user/profile
///
/// Only the display name is mutable; email changes would need re-verification
/// and are not supported.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>> {
    let mut record = load_user(state.db.clone(), auth.user_id.clone()).await?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
        }
        record.name = name;
    }

    store_user(state.db.clone(), auth.user_id.clone(), record.clone()).await?;

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        user: UserProfile::from_record(&auth.user_id, &record),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// POST /api/user/change-password
///
/// Requires the current password; sessions already issued stay valid until
/// their token expires.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()));
    }

    let mut record = load_user(state.db.clone(), auth.user_id.clone()).await?;

    let current = payload.current_password;
    let stored_hash = record.password_hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&current, &stored_hash)).await?;
    if !matches {
        return Err(AppError::InvalidInput(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_password = payload.new_password;
    record.password_hash =
        tokio::task::spawn_blocking(move || hash_password(&new_password)).await??;
    store_user(state.db.clone(), auth.user_id.clone(), record).await?;

    tracing::info!("Password changed for user {}", auth.user_id);

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// GET /api/user/payment-history
///
/// All completed upgrades for the account, newest last.
pub async fn payment_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>> {
    let record = load_user(state.db.clone(), auth.user_id).await?;

    Ok(Json(json!({ "payments": record.payment_history })))
}

/// GET /api/user/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>> {
    let record = load_user(state.db.clone(), auth.user_id).await?;

    Ok(Json(json!({
        "isPro": record.is_pro,
        "plan": record.subscription_plan,
        "status": record.subscription_status,
        "startedAt": record.subscription_started_at,
    })))
}

/// POST /api/user/subscription/cancel
///
/// Marks the subscription cancelled. Pro access is kept until the billing
/// period ends; period-end downgrades arrive via the payment webhook.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>> {
    let mut record = load_user(state.db.clone(), auth.user_id.clone()).await?;

    if !record.is_pro {
        return Err(AppError::NotPro);
    }

    record.subscription_status = "cancelled".to_string();
    store_user(state.db.clone(), auth.user_id.clone(), record).await?;

    tracing::info!("Subscription cancelled for user {}", auth.user_id);

    Ok(Json(json!({
        "message": "Subscription cancelled. You can continue using Pro features until the end of your billing period.",
    })))
}

/// DELETE /api/user/account
///
/// Removes the user record and its email index entry. Scan logs are an
/// append-only audit trail and are intentionally retained.
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>> {
    let db = state.db.clone();
    let user_id = auth.user_id.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let email = match users.remove(user_id.as_str())? {
                Some(bytes) => bincode::deserialize::<UserRecord>(bytes.value())?.email,
                None => return Err(AppError::UserNotFound),
            };
            drop(users);

            let mut by_email = write_txn.open_table(tables::USERS_BY_EMAIL)?;
            by_email.remove(email.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Account deleted: {}", auth.user_id);

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

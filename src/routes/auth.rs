use axum::{extract::State, Json};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ERR_INVALID_EMAIL, ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN};
use crate::db::tables;
use crate::error::{AppError, Result};
use crate::models::user::validate_email;
use crate::models::{UserProfile, UserRecord};
use crate::security;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

fn issue_session(state: &AppState, user_id: &str) -> String {
    security::issue_token(
        user_id,
        &state.config.token_secret,
        state.clock.now().timestamp(),
        state.config.token_ttl_secs,
    )
}

/// Register a new user
///
/// Creates a free-tier account and immediately issues a session token, so
/// the extension can start scanning without a separate login round trip.
/// Returns 400 if the email is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    if !validate_email(&email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()));
    }

    // Argon2 is deliberately slow; keep it off the async runtime
    let password = payload.password;
    let password_hash =
        tokio::task::spawn_blocking(move || security::hash_password(&password)).await??;

    let user_id = Uuid::new_v4().to_string();
    let now = state.clock.now().timestamp();
    let record = UserRecord::new(name, email.clone(), password_hash, now);

    let db = state.db.clone();
    let record_for_store = record.clone();
    let id_for_store = user_id.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut by_email = write_txn.open_table(tables::USERS_BY_EMAIL)?;
            if by_email.get(email.as_str())?.is_some() {
                tracing::info!("Registration rejected: email already exists");
                return Err(AppError::EmailTaken);
            }
            by_email.insert(email.as_str(), id_for_store.as_str())?;
            drop(by_email);

            let mut users = write_txn.open_table(tables::USERS)?;
            let bytes = bincode::serialize(&record_for_store)?;
            users.insert(id_for_store.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    })
    .await??;

    tracing::info!("New user registered: {}", user_id);

    let token = issue_session(&state, &user_id);
    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from_record(&user_id, &record),
    }))
}

/// Log in with email and password
///
/// Unknown emails and wrong passwords both answer with the same generic
/// 400 so the endpoint cannot be used to probe registered addresses.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();

    let db = state.db.clone();
    let lookup_email = email.clone();
    let found = tokio::task::spawn_blocking(move || -> Result<Option<(String, UserRecord)>> {
        let read_txn = db.begin_read()?;
        let by_email = read_txn.open_table(tables::USERS_BY_EMAIL)?;

        let user_id = match by_email.get(lookup_email.as_str())? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(tables::USERS)?;
        let record = users
            .get(user_id.as_str())?
            .map(|b| bincode::deserialize::<UserRecord>(b.value()))
            .transpose()?;

        Ok(record.map(|r| (user_id, r)))
    })
    .await??;

    let Some((user_id, mut record)) = found else {
        return Err(AppError::InvalidCredentials);
    };

    let password = payload.password;
    let stored_hash = record.password_hash.clone();
    let valid =
        tokio::task::spawn_blocking(move || security::verify_password(&password, &stored_hash))
            .await?;

    if !valid {
        tracing::info!("Failed login attempt for user {}", user_id);
        return Err(AppError::InvalidCredentials);
    }

    // Update last login
    record.last_login = state.clock.now().timestamp();
    let db = state.db.clone();
    let record_for_store = record.clone();
    let id_for_store = user_id.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let bytes = bincode::serialize(&record_for_store)?;
            users.insert(id_for_store.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("User logged in: {}", user_id);

    let token = issue_session(&state, &user_id);
    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from_record(&user_id, &record),
    }))
}

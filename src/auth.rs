use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::security;
use crate::AppState;

/// Header carrying the session token, matching the extension client
pub const AUTH_HEADER: &str = "auth-token";

/// Authenticated caller, extracted from the `auth-token` header.
///
/// Missing header -> 401, bad or expired token -> 400. The extracted id is
/// only the token's claim; handlers still resolve the user record and may
/// return 404 if the account no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingToken)?;

        let now = state.clock.now().timestamp();
        let user_id = security::verify_token(token, &state.config.token_secret, now)
            .ok_or(AppError::InvalidToken)?;

        Ok(AuthUser { user_id })
    }
}

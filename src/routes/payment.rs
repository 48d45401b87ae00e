use axum::http::HeaderMap;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::routes::user::{load_user, store_user};
use crate::security::{verify_hmac, verify_payment_signature};
use crate::AppState;

/// Gateway signature header on webhook deliveries
const WEBHOOK_SIGNATURE_HEADER: &str = "x-razorpay-signature";

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// POST /api/payment/verify
///
/// Client-side checkout completion: the gateway hands the client a signature
/// over `orderId|paymentId`; we recompute it with the key secret and upgrade
/// the account when it matches.
pub async fn verify_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<Json<Value>> {
    let (Some(order_id), Some(payment_id), Some(signature)) =
        (payload.order_id, payload.payment_id, payload.signature)
    else {
        return Err(AppError::InvalidInput(
            "Missing required payment fields".to_string(),
        ));
    };

    if !verify_payment_signature(&order_id, &payment_id, &signature, &state.config.payment_secret)
    {
        tracing::warn!("Payment signature mismatch for user {}", auth.user_id);
        return Err(AppError::InvalidSignature);
    }

    let mut record = load_user(state.db.clone(), auth.user_id.clone()).await?;
    if record.is_pro {
        return Err(AppError::AlreadyPro);
    }
    record.upgrade(payment_id, Some(order_id), state.clock.now().timestamp());
    store_user(state.db.clone(), auth.user_id.clone(), record).await?;

    tracing::info!("User {} upgraded to Pro via checkout", auth.user_id);

    Ok(Json(json!({ "message": "Payment verified successfully" })))
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: WebhookPaymentWrapper,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentWrapper {
    entity: WebhookPaymentEntity,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentEntity {
    id: String,
    #[serde(default)]
    notes: WebhookNotes,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookNotes {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// POST /api/payment/webhook (public, no session token)
///
/// Failsafe path for capture and refund events. The HMAC is computed over
/// the raw body, so the body must reach the handler unparsed. After the
/// signature checks out, processing errors are answered 200 with
/// `error_logged` so the gateway does not retry a delivery we can never
/// handle.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !verify_hmac(&body, signature, &state.config.payment_secret) {
        tracing::warn!("Webhook delivery with invalid signature");
        return Err(AppError::InvalidSignature);
    }

    let event: WebhookEvent = match serde_json::from_str(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Unparseable webhook body: {}", e);
            return Ok(Json(json!({ "status": "error_logged" })));
        }
    };

    tracing::info!("Webhook event received: {}", event.event);

    let entity = event.payload.payment.entity;
    let Some(user_id) = entity.notes.user_id else {
        // Events without our userId note (e.g. payments from other products)
        // are acknowledged and skipped
        return Ok(Json(json!({ "status": "ok" })));
    };

    let result = match event.event.as_str() {
        "payment.captured" => {
            apply_capture(&state, user_id.clone(), entity.id).await
        }
        "refund.processed" => apply_refund(&state, user_id.clone()).await,
        other => {
            tracing::debug!("Ignoring webhook event type: {}", other);
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Webhook processing error for user {}: {}", user_id, e);
            Ok(Json(json!({ "status": "error_logged" })))
        }
    }
}

async fn apply_capture(state: &AppState, user_id: String, payment_id: String) -> Result<()> {
    let mut record = load_user(state.db.clone(), user_id.clone()).await?;
    record.upgrade(payment_id, None, state.clock.now().timestamp());
    store_user(state.db.clone(), user_id.clone(), record).await?;
    tracing::info!("User {} upgraded via webhook", user_id);
    Ok(())
}

async fn apply_refund(state: &AppState, user_id: String) -> Result<()> {
    let mut record = load_user(state.db.clone(), user_id.clone()).await?;
    record.downgrade();
    store_user(state.db.clone(), user_id.clone(), record).await?;
    tracing::info!("User {} downgraded due to refund", user_id);
    Ok(())
}

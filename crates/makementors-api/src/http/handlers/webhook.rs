//! Billing webhook receiver.
//!
//! POST /api/v1/billing/webhook
//!
//! Verifies the `Stripe-Signature` header against the raw body when a
//! webhook secret is configured, reduces the event to a [`BillingEvent`],
//! and upserts subscriber state. Event types the subscriber model does not
//! track are acknowledged without side effects.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use secrecy::ExposeSecret;
use uuid::Uuid;

use makementors_infra::billing::webhook::{parse_event, verify_signature};
use makementors_types::error::BillingError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/billing/webhook - Receive a payment-provider callback.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let billing = state
        .billing
        .as_ref()
        .ok_or(AppError::Billing(BillingError::NotConfigured))?;

    match state.webhook_secret.as_ref() {
        Some(secret) => {
            let signature = headers
                .get("stripe-signature")
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::Billing(BillingError::SignatureInvalid))?;
            verify_signature(&body, signature, secret.expose_secret(), chrono::Utc::now())?;
        }
        None => {
            // Local development without a webhook secret: accept unsigned
            // events but say so loudly.
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set; accepting unverified webhook");
        }
    }

    if let Some(event) = parse_event(&body)? {
        tracing::info!(?event, "applying billing event");
        billing.apply_event(event).await?;
    }

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        serde_json::json!({"received": true}),
        request_id,
        elapsed,
    ))
}

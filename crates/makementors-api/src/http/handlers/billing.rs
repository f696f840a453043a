//! Billing relay handlers.
//!
//! Endpoints:
//! - POST /api/v1/billing/checkout              - Create a checkout session
//! - POST /api/v1/billing/portal                - Create a customer-portal session
//! - GET  /api/v1/billing/subscription/{userId} - Current subscription state
//!
//! All of these return 503 when `STRIPE_SECRET_KEY` is not configured.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use makementors_types::billing::Subscriber;
use makementors_types::error::BillingError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::{AppState, ConcreteBillingService};

fn billing(state: &AppState) -> Result<&Arc<ConcreteBillingService>, AppError> {
    state
        .billing
        .as_ref()
        .ok_or(AppError::Billing(BillingError::NotConfigured))
}

/// Request body for checkout session creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub user_id: String,
    pub email: String,
}

/// Request body for portal session creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalBody {
    pub user_id: String,
}

/// POST /api/v1/billing/checkout - Create a checkout session.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CheckoutBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let url = billing(&state)?
        .checkout(&body.user_id, &body.email)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(json!({ "url": url }), request_id, elapsed))
}

/// POST /api/v1/billing/portal - Create a customer-portal session.
pub async fn create_portal(
    State(state): State<AppState>,
    Json(body): Json<PortalBody>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let url = billing(&state)?.portal(&body.user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(json!({ "url": url }), request_id, elapsed))
}

/// GET /api/v1/billing/subscription/{userId} - Current subscription state.
pub async fn subscription_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Subscriber>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let subscriber = billing(&state)?.subscription_status(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(subscriber, request_id, elapsed))
}

//! Mentor template catalog handlers.
//!
//! Endpoints:
//! - GET /api/v1/templates      - List the template catalog
//! - GET /api/v1/templates/{id} - Get a single template

use std::time::Instant;

use axum::extract::{Path, State};
use uuid::Uuid;

use makementors_types::mentor::MentorTemplate;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/templates - List the template catalog.
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<MentorTemplate>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let templates = state
        .mentor_service
        .list_templates()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(templates, request_id, elapsed))
}

/// GET /api/v1/templates/{id} - Get a template by id.
pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<ApiResponse<MentorTemplate>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let template = state.mentor_service.get_template(&template_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(template, request_id, elapsed))
}

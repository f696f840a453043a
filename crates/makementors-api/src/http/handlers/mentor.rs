//! Custom mentor CRUD handlers.
//!
//! Endpoints:
//! - POST /api/v1/mentors          - Create a custom mentor
//! - GET  /api/v1/mentors?userId=  - List a user's mentors
//! - GET  /api/v1/mentors/{id}     - Get a custom mentor

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use makementors_types::mentor::{CreateMentorRequest, Mentor, MentorId};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for mentor listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorListQuery {
    pub user_id: String,
}

/// POST /api/v1/mentors - Create a custom mentor.
pub async fn create_mentor(
    State(state): State<AppState>,
    Json(body): Json<CreateMentorRequest>,
) -> Result<ApiResponse<Mentor>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let mentor = state.mentor_service.create_mentor(body).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(mentor, request_id, elapsed))
}

/// GET /api/v1/mentors?userId= - List mentors owned by a user.
pub async fn list_mentors(
    State(state): State<AppState>,
    Query(query): Query<MentorListQuery>,
) -> Result<ApiResponse<Vec<Mentor>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let mentors = state.mentor_service.list_mentors(&query.user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(mentors, request_id, elapsed))
}

/// GET /api/v1/mentors/{id} - Get a custom mentor by id.
pub async fn get_mentor(
    State(state): State<AppState>,
    Path(mentor_id): Path<String>,
) -> Result<ApiResponse<Mentor>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id: MentorId = mentor_id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid mentor id: {mentor_id}")))?;
    let mentor = state.mentor_service.get_mentor(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(mentor, request_id, elapsed))
}

//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions?userId=        - List sessions for a user
//! - GET    /api/v1/sessions/{id}           - Get a single session
//! - GET    /api/v1/sessions/{id}/messages  - Get messages for a session
//! - DELETE /api/v1/sessions/{id}           - Delete a session

use std::time::Instant;

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use makementors_types::chat::{ChatSession, TranscriptEntry};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for session listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// GET /api/v1/sessions?userId= - List sessions for a user.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> Result<ApiResponse<Vec<ChatSession>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state
        .chat_service
        .list_sessions(&query.user_id, Some(query.limit), Some(query.offset))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(sessions, request_id, elapsed))
}

/// GET /api/v1/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<ChatSession>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let session = state
        .chat_service
        .get_session(&sid)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(session, request_id, elapsed))
}

/// GET /api/v1/sessions/{id}/messages - Messages as `{id, role, content}`,
/// in ascending creation order.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<Vec<TranscriptEntry>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    let transcript = state
        .chat_service
        .transcript(&sid)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(transcript, request_id, elapsed))
}

/// DELETE /api/v1/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sid = parse_uuid(&session_id)?;
    state
        .chat_service
        .delete_session(&sid)
        .await
        .map_err(|e| match e {
            makementors_types::error::RepositoryError::NotFound => {
                AppError::NotFound("Session not found".to_string())
            }
            other => AppError::Internal(other.to_string()),
        })?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(ApiResponse::success(
        serde_json::json!({"deleted": true}),
        request_id,
        elapsed,
    ))
}

//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use makementors_types::error::{BillingError, MentorError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Mentor catalog errors.
    Mentor(MentorError),
    /// Billing relay errors.
    Billing(BillingError),
    /// Validation error.
    Validation(String),
    /// Entity not found.
    NotFound(String),
    /// Generic internal error.
    Internal(String),
}

impl From<MentorError> for AppError {
    fn from(e: MentorError) -> Self {
        AppError::Mentor(e)
    }
}

impl From<BillingError> for AppError {
    fn from(e: BillingError) -> Self {
        AppError::Billing(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Mentor(MentorError::NotFound) => {
                (StatusCode::NOT_FOUND, "MENTOR_NOT_FOUND", "Mentor not found".to_string())
            }
            AppError::Mentor(MentorError::InvalidName(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Mentor(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MENTOR_ERROR", e.to_string())
            }
            AppError::Billing(BillingError::NotConfigured) => {
                (StatusCode::SERVICE_UNAVAILABLE, "BILLING_NOT_CONFIGURED", "Billing is not configured".to_string())
            }
            AppError::Billing(BillingError::NoCustomer) => {
                (StatusCode::NOT_FOUND, "NO_BILLING_CUSTOMER", "No billing customer on record".to_string())
            }
            AppError::Billing(BillingError::SignatureInvalid) => {
                (StatusCode::BAD_REQUEST, "INVALID_SIGNATURE", "Webhook signature invalid".to_string())
            }
            AppError::Billing(BillingError::MalformedEvent(msg)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_EVENT", msg.clone())
            }
            AppError::Billing(e) => {
                (StatusCode::BAD_GATEWAY, "BILLING_PROVIDER_ERROR", e.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentor_not_found_maps_to_404() {
        let resp = AppError::Mentor(MentorError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn billing_unconfigured_maps_to_503() {
        let resp = AppError::Billing(BillingError::NotConfigured).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_maps_to_400() {
        let resp = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

//! Stripe billing provider implementation.
//!
//! Talks to the Stripe REST API directly with `reqwest` form posts; only the
//! two endpoints the billing relay needs are implemented.

use makementors_core::billing::provider::BillingProvider;
use makementors_types::billing::{CheckoutSession, PortalSession};
use makementors_types::error::BillingError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Stripe-backed implementation of `BillingProvider`.
///
/// Does NOT derive Debug: the secret key lives inside.
pub struct StripeBillingProvider {
    client: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

impl StripeBillingProvider {
    pub fn new(secret_key: SecretString) -> Self {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API host (used by tests and mocks).
    pub fn with_base_url(secret_key: SecretString, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, BillingError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .basic_auth(self.secret_key.expose_secret(), None::<&str>)
            .form(params)
            .send()
            .await
            .map_err(|e| BillingError::Provider(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| BillingError::Provider(format!("invalid response from {path}: {e}")))?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error");
            return Err(BillingError::Provider(format!("{status}: {message}")));
        }

        Ok(body)
    }
}

impl BillingProvider for StripeBillingProvider {
    async fn create_checkout_session(
        &self,
        user_id: &str,
        email: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let body = self
            .post_form(
                "/v1/checkout/sessions",
                &[
                    ("mode", "subscription"),
                    ("line_items[0][price]", price_id),
                    ("line_items[0][quantity]", "1"),
                    ("success_url", success_url),
                    ("cancel_url", cancel_url),
                    ("customer_email", email),
                    ("client_reference_id", user_id),
                    ("metadata[user_id]", user_id),
                ],
            )
            .await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| BillingError::Provider("checkout session missing id".to_string()))?
            .to_string();
        let url = body
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| BillingError::Provider("checkout session missing url".to_string()))?
            .to_string();

        Ok(CheckoutSession { id, url })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        let body = self
            .post_form(
                "/v1/billing_portal/sessions",
                &[("customer", customer_id), ("return_url", return_url)],
            )
            .await?;

        let url = body
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| BillingError::Provider("portal session missing url".to_string()))?
            .to_string();

        Ok(PortalSession { url })
    }
}

//! BillingProvider trait definition.
//!
//! The payment-provider surface the billing relay needs: create a checkout
//! session and a customer-portal session. Webhook verification/parsing is a
//! separate infra concern because it operates on raw request bytes.

use makementors_types::billing::{CheckoutSession, PortalSession};
use makementors_types::error::BillingError;

/// Trait for payment provider backends (e.g., Stripe).
///
/// Implementations live in makementors-infra (e.g., `StripeBillingProvider`).
pub trait BillingProvider: Send + Sync {
    /// Create a subscription checkout session and return its redirect URL.
    fn create_checkout_session(
        &self,
        user_id: &str,
        email: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> impl std::future::Future<Output = Result<CheckoutSession, BillingError>> + Send;

    /// Create a customer-portal session for an existing provider customer.
    fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> impl std::future::Future<Output = Result<PortalSession, BillingError>> + Send;
}

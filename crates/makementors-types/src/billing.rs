//! Billing and subscription types for MakeMentors.
//!
//! One subscriber row per user, upserted from payment-provider webhook
//! events. The checkout/portal types carry only what the frontend needs:
//! a redirect URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription state for a user. One row per user, upserted by webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub user_id: String,
    pub email: String,
    pub stripe_customer_id: Option<String>,
    pub subscribed: bool,
    pub subscription_tier: Option<String>,
    pub subscription_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    /// An unsubscribed placeholder row for a user with no billing history.
    pub fn unsubscribed(user_id: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            stripe_customer_id: None,
            subscribed: false,
            subscription_tier: None,
            subscription_end: None,
            updated_at: Utc::now(),
        }
    }
}

/// A checkout session created against the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A customer-portal session created against the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    pub url: String,
}

/// Provider webhook callbacks reduced to the state transitions the
/// subscriber table cares about. Everything else in the raw event is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEvent {
    /// A checkout completed; ties a user to a provider customer id.
    CheckoutCompleted {
        user_id: String,
        email: String,
        customer_id: String,
        tier: Option<String>,
        current_period_end: Option<DateTime<Utc>>,
    },
    /// Subscription created/renewed/changed for an existing customer.
    SubscriptionUpdated {
        customer_id: String,
        tier: Option<String>,
        current_period_end: Option<DateTime<Utc>>,
        active: bool,
    },
    /// Subscription cancelled for an existing customer.
    SubscriptionDeleted { customer_id: String },
}

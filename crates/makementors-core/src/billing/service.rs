//! Billing service: checkout/portal relays and webhook-driven upserts.

use chrono::Utc;
use makementors_types::billing::{BillingEvent, Subscriber};
use makementors_types::config::BillingConfig;
use makementors_types::error::BillingError;
use tracing::{info, warn};

use crate::billing::provider::BillingProvider;
use crate::billing::repository::SubscriberRepository;

/// Orchestrates payment-provider sessions and subscriber state.
///
/// Generic over the provider and repository traits so makementors-core
/// never depends on makementors-infra.
pub struct BillingService<B: BillingProvider, S: SubscriberRepository> {
    provider: B,
    subscribers: S,
    config: BillingConfig,
}

impl<B: BillingProvider, S: SubscriberRepository> BillingService<B, S> {
    pub fn new(provider: B, subscribers: S, config: BillingConfig) -> Self {
        Self {
            provider,
            subscribers,
            config,
        }
    }

    /// Create a subscription checkout session and return its redirect URL.
    pub async fn checkout(&self, user_id: &str, email: &str) -> Result<String, BillingError> {
        let price_id = self
            .config
            .price_id
            .as_deref()
            .ok_or(BillingError::NotConfigured)?;

        let session = self
            .provider
            .create_checkout_session(
                user_id,
                email,
                price_id,
                &self.config.checkout_success_url,
                &self.config.checkout_cancel_url,
            )
            .await?;

        info!(user_id = %user_id, checkout_id = %session.id, "checkout session created");
        Ok(session.url)
    }

    /// Create a customer-portal session for an already-subscribed user.
    pub async fn portal(&self, user_id: &str) -> Result<String, BillingError> {
        let subscriber = self
            .subscribers
            .get(user_id)
            .await
            .map_err(|e| BillingError::StorageError(e.to_string()))?
            .ok_or(BillingError::NoCustomer)?;

        let customer_id = subscriber
            .stripe_customer_id
            .as_deref()
            .ok_or(BillingError::NoCustomer)?;

        let session = self
            .provider
            .create_portal_session(customer_id, &self.config.portal_return_url)
            .await?;
        Ok(session.url)
    }

    /// Current subscription state for a user; unsubscribed placeholder when
    /// no billing history exists.
    pub async fn subscription_status(
        &self,
        user_id: &str,
    ) -> Result<Subscriber, BillingError> {
        let found = self
            .subscribers
            .get(user_id)
            .await
            .map_err(|e| BillingError::StorageError(e.to_string()))?;
        Ok(found.unwrap_or_else(|| Subscriber::unsubscribed(user_id, "")))
    }

    /// Apply a parsed webhook event to the subscriber table.
    pub async fn apply_event(&self, event: BillingEvent) -> Result<(), BillingError> {
        match event {
            BillingEvent::CheckoutCompleted {
                user_id,
                email,
                customer_id,
                tier,
                current_period_end,
            } => {
                let subscriber = Subscriber {
                    user_id: user_id.clone(),
                    email,
                    stripe_customer_id: Some(customer_id),
                    subscribed: true,
                    subscription_tier: tier,
                    subscription_end: current_period_end,
                    updated_at: Utc::now(),
                };
                self.subscribers
                    .upsert(&subscriber)
                    .await
                    .map_err(|e| BillingError::StorageError(e.to_string()))?;
                info!(user_id = %user_id, "subscription activated via checkout");
                Ok(())
            }
            BillingEvent::SubscriptionUpdated {
                customer_id,
                tier,
                current_period_end,
                active,
            } => {
                let Some(mut subscriber) = self
                    .subscribers
                    .find_by_customer(&customer_id)
                    .await
                    .map_err(|e| BillingError::StorageError(e.to_string()))?
                else {
                    warn!(customer_id = %customer_id, "subscription update for unknown customer");
                    return Ok(());
                };
                subscriber.subscribed = active;
                subscriber.subscription_tier = tier;
                subscriber.subscription_end = current_period_end;
                subscriber.updated_at = Utc::now();
                self.subscribers
                    .upsert(&subscriber)
                    .await
                    .map_err(|e| BillingError::StorageError(e.to_string()))
            }
            BillingEvent::SubscriptionDeleted { customer_id } => {
                let Some(mut subscriber) = self
                    .subscribers
                    .find_by_customer(&customer_id)
                    .await
                    .map_err(|e| BillingError::StorageError(e.to_string()))?
                else {
                    warn!(customer_id = %customer_id, "subscription deletion for unknown customer");
                    return Ok(());
                };
                subscriber.subscribed = false;
                subscriber.subscription_tier = None;
                subscriber.subscription_end = None;
                subscriber.updated_at = Utc::now();
                self.subscribers
                    .upsert(&subscriber)
                    .await
                    .map_err(|e| BillingError::StorageError(e.to_string()))
            }
        }
    }
}

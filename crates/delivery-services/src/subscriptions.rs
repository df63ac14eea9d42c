//! The user's subscription records and the actions on them
//!
//! `SubscriptionDesk` keeps the last fetched list of records, classifies them
//! with a `LifecyclePolicy` and refuses renewals the policy does not allow
//! before anything is sent. Every successful write re-fetches the list; a
//! failed re-fetch is logged and leaves the previous list in place, since the
//! write itself already went through.

use chrono::{DateTime, Utc};
use delivery_core::lifecycle::next_renewal_window;
use delivery_core::models::{SubscriptionRequest, UserSubscription};
use delivery_core::{ClientError, ClientResult, LifecyclePolicy, SubscriptionStatus};
use tracing::{debug, info, warn};

use crate::backend::SubscriptionApi;

pub struct SubscriptionDesk<A> {
    api: A,
    policy: LifecyclePolicy,
    subscriptions: Vec<UserSubscription>,
}

impl<A: SubscriptionApi> SubscriptionDesk<A> {
    pub fn new(api: A, policy: LifecyclePolicy) -> Self {
        Self {
            api,
            policy,
            subscriptions: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Records as of the last successful reload.
    pub fn subscriptions(&self) -> &[UserSubscription] {
        &self.subscriptions
    }

    /// Replace the local list with the service's current one.
    ///
    /// On failure the previous list is kept.
    pub async fn reload(&mut self) -> ClientResult<&[UserSubscription]> {
        self.subscriptions = self.api.fetch_my_subscriptions().await?;
        for sub in self.subscriptions.iter().filter(|sub| !sub.has_valid_period()) {
            warn!(
                id = sub.id,
                start_date = %sub.start_date,
                end_date = %sub.end_date,
                "subscription ends before it starts"
            );
        }
        debug!(count = self.subscriptions.len(), "subscriptions reloaded");
        Ok(&self.subscriptions)
    }

    async fn refresh_after_write(&mut self) {
        if let Err(err) = self.reload().await {
            warn!(error = %err, "could not refresh subscriptions, list may be stale");
        }
    }

    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<SubscriptionStatus<'_>> {
        self.policy.evaluate(&self.subscriptions, now)
    }

    pub fn expiry_warning(&self, now: DateTime<Utc>) -> Option<&UserSubscription> {
        self.policy.expiry_warning(&self.subscriptions, now)
    }

    fn find(&self, id: i64) -> ClientResult<&UserSubscription> {
        self.subscriptions
            .iter()
            .find(|sub| sub.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("subscription {}", id)))
    }

    /// Renew record `id` for one more billing period starting the day after
    /// it ends. Returns the request that was sent.
    pub async fn renew(
        &mut self,
        id: i64,
        now: DateTime<Utc>,
    ) -> ClientResult<SubscriptionRequest> {
        let sub = self.find(id)?;
        let eligibility = self
            .policy
            .renewal_eligibility(&self.subscriptions, sub, now);
        if !eligibility.is_allowed() {
            return Err(ClientError::NotEligible(eligibility.reason().to_string()));
        }

        let request = SubscriptionRequest::new(sub.subscription_id, next_renewal_window(sub));
        self.api.purchase_or_renew_subscription(&request).await?;
        info!(
            id,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "subscription renewed"
        );

        self.refresh_after_write().await;
        Ok(request)
    }

    pub async fn delete(&mut self, id: i64) -> ClientResult<()> {
        self.find(id)?;
        self.api.delete_subscription(id).await?;
        self.refresh_after_write().await;
        Ok(())
    }

    /// End record `id` now, then refresh the list.
    pub async fn expire_now(&mut self, id: i64) -> ClientResult<()> {
        self.find(id)?;
        self.api.expire_subscription_now(id).await?;
        self.refresh_after_write().await;
        Ok(())
    }
}

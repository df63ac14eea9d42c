//! Plan catalog and purchases

use chrono::{DateTime, Utc};
use delivery_core::lifecycle::{purchase_eligibility, purchase_window};
use delivery_core::models::{SubscriptionPlan, SubscriptionRequest, UserSubscription};
use delivery_core::{ClientError, ClientResult, PurchaseEligibility};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::SubscriptionApi;

/// A catalog plan and whether the user may buy it right now.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOffer<'a> {
    pub plan: &'a SubscriptionPlan,
    pub eligibility: PurchaseEligibility,
}

pub struct CatalogDesk<A> {
    api: A,
    plans: Vec<SubscriptionPlan>,
    subscriptions: Vec<UserSubscription>,
}

impl<A: SubscriptionApi> CatalogDesk<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            plans: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn plans(&self) -> &[SubscriptionPlan] {
        &self.plans
    }

    /// Fetch the catalog and the user's records together.
    pub async fn load(&mut self) -> ClientResult<()> {
        let (plans, subscriptions) = tokio::try_join!(
            self.api.fetch_available_plans(),
            self.api.fetch_my_subscriptions()
        )?;
        debug!(
            plans = plans.len(),
            subscriptions = subscriptions.len(),
            "catalog loaded"
        );
        self.plans = plans;
        self.subscriptions = subscriptions;
        Ok(())
    }

    pub fn offers(&self, now: DateTime<Utc>) -> Vec<PlanOffer<'_>> {
        self.plans
            .iter()
            .map(|plan| PlanOffer {
                plan,
                eligibility: purchase_eligibility(plan, &self.subscriptions, now),
            })
            .collect()
    }

    /// Buy `plan_id` for one billing period starting today.
    ///
    /// The gate runs locally first; a refused plan sends nothing. A failed
    /// refresh afterwards is logged and does not undo the reported success.
    pub async fn purchase(
        &mut self,
        plan_id: i64,
        now: DateTime<Utc>,
    ) -> ClientResult<SubscriptionRequest> {
        let plan = self
            .plans
            .iter()
            .find(|plan| plan.id == plan_id)
            .ok_or_else(|| ClientError::NotFound(format!("plan {}", plan_id)))?;

        let eligibility = purchase_eligibility(plan, &self.subscriptions, now);
        if !eligibility.is_allowed() {
            return Err(ClientError::NotEligible(eligibility.reason().to_string()));
        }

        let request = SubscriptionRequest::new(plan.id, purchase_window(plan, now.date_naive()));
        self.api.purchase_or_renew_subscription(&request).await?;
        info!(plan = %plan.name, end_date = %request.end_date, "plan purchased");

        match self.api.fetch_my_subscriptions().await {
            Ok(subscriptions) => self.subscriptions = subscriptions,
            Err(err) => {
                warn!(error = %err, "could not refresh subscriptions after purchase");
            }
        }
        Ok(request)
    }
}

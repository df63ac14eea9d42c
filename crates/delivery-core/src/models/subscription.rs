use std::fmt;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates;

pub const PREMIUM_PLAN: &str = "PREMIUM_PLAN";
pub const GOLD_PLAN: &str = "GOLD_PLAN";

/// Plan tier a subscription belongs to. The service identifies tiers by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanTier {
    Premium,
    Gold,
    Other(String),
}

impl PlanTier {
    pub fn as_str(&self) -> &str {
        match self {
            PlanTier::Premium => PREMIUM_PLAN,
            PlanTier::Gold => GOLD_PLAN,
            PlanTier::Other(name) => name,
        }
    }

    /// Premium and gold tiers may only be held once at a time.
    pub fn is_higher_tier(&self) -> bool {
        matches!(self, PlanTier::Premium | PlanTier::Gold)
    }

    /// Billing period implied by the tier when a record does not state one.
    pub fn default_period(&self) -> BillingPeriod {
        match self {
            PlanTier::Gold => BillingPeriod::Annual,
            _ => BillingPeriod::Monthly,
        }
    }

    /// Human readable name: `GOLD_PLAN` becomes `GOLD PLAN`.
    pub fn display_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl From<String> for PlanTier {
    fn from(name: String) -> Self {
        match name.as_str() {
            PREMIUM_PLAN => PlanTier::Premium,
            GOLD_PLAN => PlanTier::Gold,
            _ => PlanTier::Other(name),
        }
    }
}

impl From<PlanTier> for String {
    fn from(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing period of a plan (`typeSubscription` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingPeriod {
    Monthly,
    Annual,
    Other(String),
}

impl BillingPeriod {
    pub fn as_str(&self) -> &str {
        match self {
            BillingPeriod::Monthly => "MONTHLY",
            BillingPeriod::Annual => "ANNUAL",
            BillingPeriod::Other(name) => name,
        }
    }

    /// Only monthly and annual plans can be bought from the client.
    pub fn is_purchasable(&self) -> bool {
        matches!(self, BillingPeriod::Monthly | BillingPeriod::Annual)
    }

    /// Calendar length of one period. Unknown periods count as one month.
    pub fn months(&self) -> u32 {
        match self {
            BillingPeriod::Annual => 12,
            _ => 1,
        }
    }

    /// `start` advanced by one period; the day is clamped to the month's end.
    pub fn advance(&self, start: NaiveDate) -> NaiveDate {
        start
            .checked_add_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl From<String> for BillingPeriod {
    fn from(name: String) -> Self {
        match name.as_str() {
            "MONTHLY" => BillingPeriod::Monthly,
            "ANNUAL" => BillingPeriod::Annual,
            _ => BillingPeriod::Other(name),
        }
    }
}

impl From<BillingPeriod> for String {
    fn from(period: BillingPeriod) -> Self {
        match period {
            BillingPeriod::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchasable plan from the catalog (GET /subscription).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: PlanTier,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub type_subscription: BillingPeriod,
}

/// Subscription record owned by the signed-in user (GET /user/subscription).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscription {
    pub id: i64,
    /// Catalog plan this record was bought from.
    pub subscription_id: i64,
    /// Plan tier name, e.g. `GOLD_PLAN`.
    pub subscription: PlanTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<BillingPeriod>,
    #[serde(with = "dates")]
    pub start_date: NaiveDate,
    #[serde(with = "dates")]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserSubscription {
    /// Period used for renewals: the explicit type if present, else the tier's.
    pub fn billing_period(&self) -> BillingPeriod {
        self.subscription_type
            .clone()
            .unwrap_or_else(|| self.subscription.default_period())
    }

    /// Records must not end before they start.
    pub fn has_valid_period(&self) -> bool {
        self.start_date <= self.end_date
    }
}

/// Validity window for a purchase or renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalWindow {
    #[serde(with = "dates")]
    pub start_date: NaiveDate,
    #[serde(with = "dates")]
    pub end_date: NaiveDate,
}

/// Body of POST /user/subscription, used for both purchase and renewal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub subscription_id: i64,
    #[serde(with = "dates")]
    pub start_date: NaiveDate,
    #[serde(with = "dates")]
    pub end_date: NaiveDate,
}

impl SubscriptionRequest {
    pub fn new(subscription_id: i64, window: RenewalWindow) -> Self {
        Self {
            subscription_id,
            start_date: window.start_date,
            end_date: window.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_tier_round_trips_known_and_unknown_names() {
        assert_eq!(PlanTier::from("GOLD_PLAN".to_string()), PlanTier::Gold);
        assert_eq!(PlanTier::from("PREMIUM_PLAN".to_string()), PlanTier::Premium);
        let basic = PlanTier::from("BASIC_PLAN".to_string());
        assert_eq!(basic, PlanTier::Other("BASIC_PLAN".to_string()));
        assert_eq!(String::from(basic), "BASIC_PLAN");
    }

    #[test]
    fn display_name_replaces_underscores() {
        assert_eq!(PlanTier::Gold.display_name(), "GOLD PLAN");
        assert_eq!(
            PlanTier::Other("FAMILY_PLUS_PLAN".to_string()).display_name(),
            "FAMILY PLUS PLAN"
        );
    }

    #[test]
    fn monthly_advance_clamps_to_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            BillingPeriod::Monthly.advance(jan31),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            BillingPeriod::Annual.advance(jan31),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
        );
    }

    #[test]
    fn deserializes_user_subscription_from_wire() {
        let json = r#"{
            "id": 7,
            "subscriptionId": 2,
            "subscription": "GOLD_PLAN",
            "startDate": "2024-03-10",
            "endDate": "2025-03-10T00:00:00",
            "isActive": true
        }"#;
        let sub: UserSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.id, 7);
        assert_eq!(sub.subscription, PlanTier::Gold);
        assert_eq!(sub.subscription_type, None);
        assert_eq!(sub.billing_period(), BillingPeriod::Annual);
        assert_eq!(sub.end_date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(sub.has_valid_period());
    }

    #[test]
    fn explicit_subscription_type_wins_over_tier() {
        let json = r#"{
            "id": 1,
            "subscriptionId": 1,
            "subscription": "PREMIUM_PLAN",
            "subscriptionType": "ANNUAL",
            "startDate": "2024-01-01",
            "endDate": "2024-02-01"
        }"#;
        let sub: UserSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.billing_period(), BillingPeriod::Annual);
    }

    #[test]
    fn subscription_request_serializes_plain_dates() {
        let window = RenewalWindow {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(),
        };
        let body = serde_json::to_value(SubscriptionRequest::new(3, window)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "subscriptionId": 3,
                "startDate": "2024-03-11",
                "endDate": "2024-04-11"
            })
        );
    }

    #[test]
    fn plan_catalog_entry_parses_price() {
        let json = r#"{"id": 4, "name": "PREMIUM_PLAN", "description": "Free delivery",
                       "price": 29.99, "typeSubscription": "MONTHLY"}"#;
        let plan: SubscriptionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.price, Decimal::new(2999, 2));
        assert_eq!(plan.type_subscription, BillingPeriod::Monthly);
        assert!(plan.type_subscription.is_purchasable());
    }
}

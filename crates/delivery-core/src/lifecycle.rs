//! Subscription lifecycle rules
//!
//! Pure functions that classify a user's subscription records and gate the
//! purchase and renew actions. Callers pass `now` explicitly; nothing here
//! reads the clock or fails. A record's `end_date` is compared as the instant
//! `end_date 00:00 UTC`.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::models::dates::start_of_day_utc;
use crate::models::{RenewalWindow, SubscriptionPlan, UserSubscription};

/// Default look-ahead, in days, for the expiring-soon warning.
pub const EXPIRY_WINDOW_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Tunable parts of the lifecycle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Records ending within this many (rounded-up) days count as expiring soon.
    pub expiry_window_days: i64,
    /// Refuse renewal when the record is the user's only active one and it is
    /// not expiring soon.
    pub block_lone_active: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            expiry_window_days: EXPIRY_WINDOW_DAYS,
            block_lone_active: true,
        }
    }
}

/// Whether a record may be renewed, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalEligibility {
    Allowed,
    /// Another active record of the same tier already exists.
    BlockedSameTypeActive,
    /// This is the only active record and it is not about to expire.
    BlockedLoneActive,
}

impl RenewalEligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RenewalEligibility::Allowed)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RenewalEligibility::Allowed => "renewal allowed",
            RenewalEligibility::BlockedSameTypeActive => {
                "an active subscription of the same type already exists"
            }
            RenewalEligibility::BlockedLoneActive => {
                "the only active subscription can be renewed once it is about to expire"
            }
        }
    }
}

/// Whether a catalog plan may be bought, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseEligibility {
    Allowed,
    /// Plan is neither monthly nor annual.
    UnsupportedPeriod,
    /// A premium or gold subscription is already active.
    BlockedHigherTierActive,
}

impl PurchaseEligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PurchaseEligibility::Allowed)
    }

    pub fn reason(&self) -> &'static str {
        match self {
            PurchaseEligibility::Allowed => "purchase allowed",
            PurchaseEligibility::UnsupportedPeriod => "plan cannot be bought from the client",
            PurchaseEligibility::BlockedHigherTierActive => {
                "a premium or gold subscription is already active"
            }
        }
    }
}

/// Display state of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Starts in the future.
    Upcoming,
    Active,
    ExpiringSoon,
    Expired,
}

/// A record together with everything derived from it for display.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatus<'a> {
    pub subscription: &'a UserSubscription,
    pub state: SubscriptionState,
    pub days_remaining: i64,
    pub renewal: RenewalEligibility,
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    if numerator.rem_euclid(denominator) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

/// Whole days until `end_date`, rounded up (negative once it has passed).
pub fn days_until_end(sub: &UserSubscription, now: DateTime<Utc>) -> i64 {
    let remaining = start_of_day_utc(sub.end_date) - now;
    ceil_div(remaining.num_milliseconds(), MILLIS_PER_DAY)
}

/// A record is active while its end date lies in the future.
pub fn is_active(sub: &UserSubscription, now: DateTime<Utc>) -> bool {
    start_of_day_utc(sub.end_date) > now
}

/// `0 <= ceil((end - now) / 1 day) <= 3`.
pub fn is_expiring_soon(sub: &UserSubscription, now: DateTime<Utc>) -> bool {
    LifecyclePolicy::default().is_expiring_soon(sub, now)
}

/// True iff a different record of the same tier is still active.
pub fn has_active_subscription_of_same_type(
    subs: &[UserSubscription],
    candidate: &UserSubscription,
    now: DateTime<Utc>,
) -> bool {
    subs.iter().any(|sub| {
        sub.subscription == candidate.subscription && is_active(sub, now) && sub.id != candidate.id
    })
}

/// Exactly one active record, and it is not expiring soon.
pub fn is_single_active_subscription(subs: &[UserSubscription], now: DateTime<Utc>) -> bool {
    LifecyclePolicy::default().is_single_active_subscription(subs, now)
}

/// Window a renewal would cover: the day after `end_date` for one period.
pub fn next_renewal_window(sub: &UserSubscription) -> RenewalWindow {
    let start_date = sub
        .end_date
        .checked_add_days(Days::new(1))
        .unwrap_or(sub.end_date);
    RenewalWindow {
        start_date,
        end_date: sub.billing_period().advance(start_date),
    }
}

/// Any premium or gold record still active.
pub fn has_active_higher_tier(subs: &[UserSubscription], now: DateTime<Utc>) -> bool {
    subs.iter()
        .any(|sub| sub.subscription.is_higher_tier() && is_active(sub, now))
}

/// Whether `plan` can be bought given the user's current records.
pub fn purchase_eligibility(
    plan: &SubscriptionPlan,
    subs: &[UserSubscription],
    now: DateTime<Utc>,
) -> PurchaseEligibility {
    if !plan.type_subscription.is_purchasable() {
        return PurchaseEligibility::UnsupportedPeriod;
    }
    if plan.name.is_higher_tier() && has_active_higher_tier(subs, now) {
        return PurchaseEligibility::BlockedHigherTierActive;
    }
    PurchaseEligibility::Allowed
}

/// Window a fresh purchase covers: from `today` for one billing period.
pub fn purchase_window(plan: &SubscriptionPlan, today: NaiveDate) -> RenewalWindow {
    RenewalWindow {
        start_date: today,
        end_date: plan.type_subscription.advance(today),
    }
}

/// Renewal gate under the default policy.
pub fn renewal_eligibility(
    subs: &[UserSubscription],
    sub: &UserSubscription,
    now: DateTime<Utc>,
) -> RenewalEligibility {
    LifecyclePolicy::default().renewal_eligibility(subs, sub, now)
}

/// Record to warn about on the home screen under the default policy.
pub fn expiry_warning(subs: &[UserSubscription], now: DateTime<Utc>) -> Option<&UserSubscription> {
    LifecyclePolicy::default().expiry_warning(subs, now)
}

impl LifecyclePolicy {
    pub fn is_expiring_soon(&self, sub: &UserSubscription, now: DateTime<Utc>) -> bool {
        (0..=self.expiry_window_days).contains(&days_until_end(sub, now))
    }

    pub fn is_single_active_subscription(
        &self,
        subs: &[UserSubscription],
        now: DateTime<Utc>,
    ) -> bool {
        let mut active = subs.iter().filter(|sub| is_active(sub, now));
        match (active.next(), active.next()) {
            (Some(only), None) => !self.is_expiring_soon(only, now),
            _ => false,
        }
    }

    pub fn renewal_eligibility(
        &self,
        subs: &[UserSubscription],
        sub: &UserSubscription,
        now: DateTime<Utc>,
    ) -> RenewalEligibility {
        if has_active_subscription_of_same_type(subs, sub, now) {
            return RenewalEligibility::BlockedSameTypeActive;
        }
        if self.block_lone_active && self.is_single_active_subscription(subs, now) {
            return RenewalEligibility::BlockedLoneActive;
        }
        RenewalEligibility::Allowed
    }

    /// First expiring-soon record, provided no other record stays active.
    pub fn expiry_warning<'a>(
        &self,
        subs: &'a [UserSubscription],
        now: DateTime<Utc>,
    ) -> Option<&'a UserSubscription> {
        let expiring = subs.iter().find(|sub| self.is_expiring_soon(sub, now))?;
        let covered = subs
            .iter()
            .any(|sub| sub.id != expiring.id && is_active(sub, now));
        (!covered).then_some(expiring)
    }

    pub fn state(&self, sub: &UserSubscription, now: DateTime<Utc>) -> SubscriptionState {
        if !is_active(sub, now) {
            SubscriptionState::Expired
        } else if start_of_day_utc(sub.start_date) > now {
            SubscriptionState::Upcoming
        } else if self.is_expiring_soon(sub, now) {
            SubscriptionState::ExpiringSoon
        } else {
            SubscriptionState::Active
        }
    }

    /// Classify every record for display.
    pub fn evaluate<'a>(
        &self,
        subs: &'a [UserSubscription],
        now: DateTime<Utc>,
    ) -> Vec<SubscriptionStatus<'a>> {
        subs.iter()
            .map(|sub| SubscriptionStatus {
                subscription: sub,
                state: self.state(sub, now),
                days_remaining: days_until_end(sub, now),
                renewal: self.renewal_eligibility(subs, sub, now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillingPeriod, PlanTier};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sub(id: i64, tier: PlanTier, start: NaiveDate, end: NaiveDate) -> UserSubscription {
        UserSubscription {
            id,
            subscription_id: id * 10,
            subscription: tier,
            subscription_type: None,
            start_date: start,
            end_date: end,
            is_active: None,
        }
    }

    fn plan(name: PlanTier, period: BillingPeriod) -> SubscriptionPlan {
        SubscriptionPlan {
            id: 1,
            name,
            description: None,
            price: Decimal::new(1999, 2),
            type_subscription: period,
        }
    }

    #[test]
    fn expiring_soon_uses_rounded_up_days() {
        let now = at(2024, 1, 1, 0);
        let soon = sub(1, PlanTier::Premium, date(2023, 12, 1), date(2024, 1, 3));
        let later = sub(2, PlanTier::Premium, date(2023, 12, 1), date(2024, 1, 5));
        assert!(is_expiring_soon(&soon, now));
        assert!(!is_expiring_soon(&later, now));
    }

    #[test]
    fn expiring_soon_counts_two_days_one_hour_as_three() {
        // end 2024-01-04 00:00, now 2024-01-01 23:00 -> 2d 1h -> 3 days
        let now = at(2024, 1, 1, 23);
        let record = sub(1, PlanTier::Gold, date(2023, 1, 4), date(2024, 1, 4));
        assert_eq!(days_until_end(&record, now), 3);
        assert!(is_expiring_soon(&record, now));

        // 3d 1h -> 4 days
        let now = at(2023, 12, 31, 23);
        assert_eq!(days_until_end(&record, now), 4);
        assert!(!is_expiring_soon(&record, now));
    }

    #[test]
    fn expiring_soon_bounds() {
        let record = sub(1, PlanTier::Gold, date(2023, 1, 1), date(2024, 1, 10));
        // exactly on the end instant: 0 days
        assert!(is_expiring_soon(&record, at(2024, 1, 10, 0)));
        // within the last day after the end: ceil of a negative fraction is 0
        assert_eq!(days_until_end(&record, at(2024, 1, 10, 12)), 0);
        // a full day past the end
        assert!(!is_expiring_soon(&record, at(2024, 1, 11, 1)));
    }

    #[test]
    fn same_type_check_ignores_the_candidate_itself() {
        let now = at(2024, 1, 1, 0);
        let only = sub(1, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1));
        let subs = vec![only.clone()];
        assert!(!has_active_subscription_of_same_type(&subs, &only, now));
    }

    #[test]
    fn same_type_check_finds_another_active_record() {
        let now = at(2024, 1, 1, 0);
        let old = sub(1, PlanTier::Gold, date(2023, 1, 1), date(2024, 1, 2));
        let renewed = sub(2, PlanTier::Gold, date(2024, 1, 3), date(2025, 1, 3));
        let other_tier = sub(3, PlanTier::Premium, date(2023, 12, 1), date(2024, 2, 1));
        let subs = vec![old.clone(), renewed, other_tier.clone()];
        assert!(has_active_subscription_of_same_type(&subs, &old, now));
        assert!(!has_active_subscription_of_same_type(&subs, &other_tier, now));
    }

    #[test]
    fn same_type_check_ignores_expired_records() {
        let now = at(2024, 1, 1, 0);
        let expired = sub(1, PlanTier::Gold, date(2022, 1, 1), date(2023, 1, 1));
        let current = sub(2, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1));
        let subs = vec![expired, current.clone()];
        assert!(!has_active_subscription_of_same_type(&subs, &current, now));
    }

    #[test]
    fn single_active_requires_exactly_one_non_expiring_record() {
        let now = at(2024, 1, 1, 0);
        let long = sub(1, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1));
        let expiring = sub(2, PlanTier::Premium, date(2023, 12, 1), date(2024, 1, 2));
        let expired = sub(3, PlanTier::Premium, date(2022, 12, 1), date(2023, 1, 1));

        assert!(is_single_active_subscription(&[long.clone(), expired.clone()], now));
        assert!(!is_single_active_subscription(&[expiring.clone()], now));
        assert!(!is_single_active_subscription(&[long, expiring], now));
        assert!(!is_single_active_subscription(&[expired], now));
        assert!(!is_single_active_subscription(&[], now));
    }

    #[test]
    fn monthly_renewal_window() {
        let mut record = sub(1, PlanTier::Premium, date(2024, 2, 10), date(2024, 3, 10));
        record.subscription_type = Some(BillingPeriod::Monthly);
        let window = next_renewal_window(&record);
        assert_eq!(window.start_date, date(2024, 3, 11));
        assert_eq!(window.end_date, date(2024, 4, 11));
    }

    #[test]
    fn annual_renewal_window() {
        let mut record = sub(1, PlanTier::Premium, date(2023, 3, 10), date(2024, 3, 10));
        record.subscription_type = Some(BillingPeriod::Annual);
        let window = next_renewal_window(&record);
        assert_eq!(window.start_date, date(2024, 3, 11));
        assert_eq!(window.end_date, date(2025, 3, 11));

        let gold = sub(2, PlanTier::Gold, date(2023, 3, 10), date(2024, 3, 10));
        assert_eq!(next_renewal_window(&gold).end_date, date(2025, 3, 11));
    }

    #[test]
    fn higher_tier_detection() {
        let now = at(2024, 1, 1, 0);
        let basic = sub(1, PlanTier::Other("BASIC_PLAN".into()), date(2023, 1, 1), date(2025, 1, 1));
        let expired_gold = sub(2, PlanTier::Gold, date(2022, 1, 1), date(2023, 1, 1));
        let premium = sub(3, PlanTier::Premium, date(2023, 12, 1), date(2024, 1, 20));

        assert!(!has_active_higher_tier(&[basic.clone(), expired_gold.clone()], now));
        assert!(has_active_higher_tier(&[basic, expired_gold, premium], now));
    }

    #[test]
    fn purchase_gating() {
        let now = at(2024, 1, 1, 0);
        let active_gold = vec![sub(1, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1))];

        let premium = plan(PlanTier::Premium, BillingPeriod::Monthly);
        assert_eq!(
            purchase_eligibility(&premium, &active_gold, now),
            PurchaseEligibility::BlockedHigherTierActive
        );
        assert!(purchase_eligibility(&premium, &[], now).is_allowed());

        let basic = plan(PlanTier::Other("BASIC_PLAN".into()), BillingPeriod::Monthly);
        assert!(purchase_eligibility(&basic, &active_gold, now).is_allowed());

        let weekly = plan(PlanTier::Other("TRIAL".into()), BillingPeriod::Other("WEEKLY".into()));
        assert_eq!(
            purchase_eligibility(&weekly, &[], now),
            PurchaseEligibility::UnsupportedPeriod
        );
    }

    #[test]
    fn purchase_window_follows_plan_period() {
        let today = date(2024, 5, 20);
        let monthly = plan(PlanTier::Premium, BillingPeriod::Monthly);
        let annual = plan(PlanTier::Gold, BillingPeriod::Annual);
        assert_eq!(purchase_window(&monthly, today).end_date, date(2024, 6, 20));
        assert_eq!(purchase_window(&annual, today).start_date, today);
        assert_eq!(purchase_window(&annual, today).end_date, date(2025, 5, 20));
    }

    #[test]
    fn renewal_blocked_for_lone_non_expiring_record() {
        let now = at(2024, 1, 1, 0);
        let lone = sub(1, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1));
        let subs = vec![lone.clone()];
        assert_eq!(
            renewal_eligibility(&subs, &lone, now),
            RenewalEligibility::BlockedLoneActive
        );

        let relaxed = LifecyclePolicy {
            block_lone_active: false,
            ..LifecyclePolicy::default()
        };
        assert!(relaxed.renewal_eligibility(&subs, &lone, now).is_allowed());
    }

    #[test]
    fn renewal_allowed_when_lone_record_is_expiring() {
        let now = at(2024, 1, 1, 0);
        let expiring = sub(1, PlanTier::Premium, date(2023, 12, 2), date(2024, 1, 2));
        let subs = vec![expiring.clone()];
        assert!(renewal_eligibility(&subs, &expiring, now).is_allowed());
    }

    #[test]
    fn renewal_blocked_by_same_type_duplicate_even_when_policy_relaxed() {
        let now = at(2024, 1, 1, 0);
        let old = sub(1, PlanTier::Gold, date(2023, 1, 1), date(2024, 1, 2));
        let renewed = sub(2, PlanTier::Gold, date(2024, 1, 3), date(2025, 1, 3));
        let subs = vec![old.clone(), renewed];
        let relaxed = LifecyclePolicy {
            block_lone_active: false,
            ..LifecyclePolicy::default()
        };
        assert_eq!(
            relaxed.renewal_eligibility(&subs, &old, now),
            RenewalEligibility::BlockedSameTypeActive
        );
    }

    #[test]
    fn expiry_warning_only_without_other_active_records() {
        let now = at(2024, 1, 1, 0);
        let expiring = sub(1, PlanTier::Premium, date(2023, 12, 2), date(2024, 1, 2));
        let backup = sub(2, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1));
        let expired = sub(3, PlanTier::Gold, date(2022, 6, 1), date(2023, 6, 1));

        assert_eq!(
            expiry_warning(&[expiring.clone(), expired.clone()], now).map(|s| s.id),
            Some(1)
        );
        assert!(expiry_warning(&[expiring, backup.clone()], now).is_none());
        assert!(expiry_warning(&[backup, expired], now).is_none());
    }

    #[test]
    fn evaluate_classifies_each_record() {
        let now = at(2024, 1, 1, 12);
        let subs = vec![
            sub(1, PlanTier::Premium, date(2023, 12, 2), date(2024, 1, 3)),
            sub(2, PlanTier::Gold, date(2023, 6, 1), date(2024, 6, 1)),
            sub(3, PlanTier::Gold, date(2022, 6, 1), date(2023, 6, 1)),
            sub(4, PlanTier::Other("BASIC_PLAN".into()), date(2024, 2, 1), date(2024, 3, 1)),
        ];
        let statuses = LifecyclePolicy::default().evaluate(&subs, now);
        let states: Vec<_> = statuses.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                SubscriptionState::ExpiringSoon,
                SubscriptionState::Active,
                SubscriptionState::Expired,
                SubscriptionState::Upcoming,
            ]
        );
        assert_eq!(statuses[0].days_remaining, 2);
        // record 3 is expired but record 2 of the same tier is active
        assert_eq!(statuses[2].renewal, RenewalEligibility::BlockedSameTypeActive);
    }

    #[test]
    fn wider_window_policy() {
        let now = at(2024, 1, 1, 0);
        let record = sub(1, PlanTier::Premium, date(2023, 12, 1), date(2024, 1, 8));
        let policy = LifecyclePolicy {
            expiry_window_days: 7,
            ..LifecyclePolicy::default()
        };
        assert!(!is_expiring_soon(&record, now));
        assert!(policy.is_expiring_soon(&record, now));
    }
}

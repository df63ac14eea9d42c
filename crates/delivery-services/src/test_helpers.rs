//! In-memory stand-ins for the delivery API used by the service tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use delivery_core::models::{
    BillingPeriod, MenuItem, OrderConfirmation, OrderItem, OrderRequest, PlanTier, PriceQuote,
    Restaurant, RestaurantMenus, SubscriptionPlan, SubscriptionRequest, UserSubscription,
};
use delivery_core::{ClientError, ClientResult, Operation};
use rust_decimal::Decimal;

use crate::backend::{OrderingApi, SubscriptionApi};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn menu_item(id: i64, price: i64) -> MenuItem {
    MenuItem {
        id,
        name: format!("item-{id}"),
        price: Decimal::new(price, 0),
        is_available: true,
        ingredients: Vec::new(),
    }
}

pub fn user_sub(id: i64, tier: PlanTier, start: NaiveDate, end: NaiveDate) -> UserSubscription {
    UserSubscription {
        id,
        subscription_id: id * 10,
        subscription: tier,
        subscription_type: None,
        start_date: start,
        end_date: end,
        is_active: Some(true),
    }
}

pub fn plan(id: i64, tier: PlanTier, period: BillingPeriod) -> SubscriptionPlan {
    SubscriptionPlan {
        id,
        name: tier,
        description: None,
        price: Decimal::new(999, 2),
        type_subscription: period,
    }
}

fn boom(operation: Operation) -> ClientError {
    ClientError::RequestFailed {
        operation,
        status: Some(500),
        detail: "boom".to_string(),
    }
}

/// Prices every unit at 10 with a flat transport fee of 5.
#[derive(Default)]
pub struct FakeOrdering {
    fail_quotes: AtomicBool,
    fail_orders: AtomicBool,
    orders: Mutex<Vec<OrderRequest>>,
}

impl FakeOrdering {
    pub fn fail_quotes(&self, fail: bool) {
        self.fail_quotes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderingApi for FakeOrdering {
    async fn fetch_restaurants_with_menus(&self) -> ClientResult<Vec<RestaurantMenus>> {
        Ok(vec![RestaurantMenus {
            restaurant_dto: Restaurant {
                id: 1,
                name: "Trattoria".to_string(),
                address: None,
            },
            menu_dtos: vec![menu_item(1, 10)],
        }])
    }

    async fn quote_price(&self, items: &[OrderItem]) -> ClientResult<PriceQuote> {
        if self.fail_quotes.load(Ordering::SeqCst) {
            return Err(boom(Operation::QuotePrice));
        }
        let units: u32 = items.iter().map(|i| i.product_quantity).sum();
        let products_price = Decimal::from(units) * Decimal::new(10, 0);
        let transport_price = Decimal::new(5, 0);
        Ok(PriceQuote {
            products_price,
            transport_price,
            total_price: products_price + transport_price,
        })
    }

    async fn submit_order(&self, order: &OrderRequest) -> ClientResult<OrderConfirmation> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(boom(Operation::SubmitOrder));
        }
        let mut orders = self.orders.lock().unwrap();
        orders.push(order.clone());
        Ok(OrderConfirmation {
            details: serde_json::json!({ "id": orders.len() }),
        })
    }
}

/// Holds the user's records and records every mutating call.
#[derive(Default)]
pub struct FakeSubscriptions {
    pub plans: Vec<SubscriptionPlan>,
    pub records: Mutex<Vec<UserSubscription>>,
    pub purchases: Mutex<Vec<SubscriptionRequest>>,
    pub deleted: Mutex<Vec<i64>>,
    pub expired: Mutex<Vec<i64>>,
    pub fetches: Mutex<u32>,
    pub fail_writes: AtomicBool,
    /// Makes `fetch_my_subscriptions` fail from now on.
    pub fail_fetches: AtomicBool,
}

impl FakeSubscriptions {
    pub fn with_records(records: Vec<UserSubscription>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl SubscriptionApi for FakeSubscriptions {
    async fn fetch_available_plans(&self) -> ClientResult<Vec<SubscriptionPlan>> {
        Ok(self.plans.clone())
    }

    async fn fetch_my_subscriptions(&self) -> ClientResult<Vec<UserSubscription>> {
        *self.fetches.lock().unwrap() += 1;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(boom(Operation::FetchMySubscriptions));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn purchase_or_renew_subscription(
        &self,
        payload: &SubscriptionRequest,
    ) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(boom(Operation::PurchaseOrRenewSubscription));
        }
        self.purchases.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn delete_subscription(&self, id: i64) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(boom(Operation::DeleteSubscription));
        }
        self.deleted.lock().unwrap().push(id);
        self.records.lock().unwrap().retain(|sub| sub.id != id);
        Ok(())
    }

    async fn expire_subscription_now(&self, id: i64) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(boom(Operation::ExpireSubscription));
        }
        self.expired.lock().unwrap().push(id);
        Ok(())
    }
}

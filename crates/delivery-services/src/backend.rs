//! Remote operations the services depend on
//!
//! The services talk to the delivery API through these traits so they can be
//! driven by `ApiClient` in production and by in-memory fakes in tests.

use async_trait::async_trait;
use delivery_api_client::ApiClient;
use delivery_core::models::{
    OrderConfirmation, OrderItem, OrderRequest, PriceQuote, RestaurantMenus, SubscriptionPlan,
    SubscriptionRequest, UserSubscription,
};
use delivery_core::ClientResult;

/// Menu browsing, price quotes and order placement
#[async_trait]
pub trait OrderingApi: Send + Sync {
    async fn fetch_restaurants_with_menus(&self) -> ClientResult<Vec<RestaurantMenus>>;

    async fn quote_price(&self, items: &[OrderItem]) -> ClientResult<PriceQuote>;

    async fn submit_order(&self, order: &OrderRequest) -> ClientResult<OrderConfirmation>;
}

/// Plan catalog and the user's subscription records
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn fetch_available_plans(&self) -> ClientResult<Vec<SubscriptionPlan>>;

    async fn fetch_my_subscriptions(&self) -> ClientResult<Vec<UserSubscription>>;

    async fn purchase_or_renew_subscription(&self, payload: &SubscriptionRequest)
        -> ClientResult<()>;

    async fn delete_subscription(&self, id: i64) -> ClientResult<()>;

    async fn expire_subscription_now(&self, id: i64) -> ClientResult<()>;
}

#[async_trait]
impl OrderingApi for ApiClient {
    async fn fetch_restaurants_with_menus(&self) -> ClientResult<Vec<RestaurantMenus>> {
        ApiClient::fetch_restaurants_with_menus(self).await
    }

    async fn quote_price(&self, items: &[OrderItem]) -> ClientResult<PriceQuote> {
        ApiClient::quote_price(self, items).await
    }

    async fn submit_order(&self, order: &OrderRequest) -> ClientResult<OrderConfirmation> {
        ApiClient::submit_order(self, order).await
    }
}

#[async_trait]
impl SubscriptionApi for ApiClient {
    async fn fetch_available_plans(&self) -> ClientResult<Vec<SubscriptionPlan>> {
        ApiClient::fetch_available_plans(self).await
    }

    async fn fetch_my_subscriptions(&self) -> ClientResult<Vec<UserSubscription>> {
        ApiClient::fetch_my_subscriptions(self).await
    }

    async fn purchase_or_renew_subscription(
        &self,
        payload: &SubscriptionRequest,
    ) -> ClientResult<()> {
        ApiClient::purchase_or_renew_subscription(self, payload).await
    }

    async fn delete_subscription(&self, id: i64) -> ClientResult<()> {
        ApiClient::delete_subscription(self, id).await
    }

    async fn expire_subscription_now(&self, id: i64) -> ClientResult<()> {
        ApiClient::expire_subscription_now(self, id).await
    }
}

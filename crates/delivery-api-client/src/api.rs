//! Domain methods for the delivery API client.
//!
//! One method per endpoint. Request and response types come from
//! `delivery_core::models`.

use delivery_core::models::{
    AccountResponse, OrderConfirmation, OrderItem, OrderRequest, PriceQuote, QuoteRequestBody,
    RestaurantMenus, SignInRequest, SignUpRequest, SubscriptionPlan, SubscriptionRequest,
    UserSubscription,
};
use delivery_core::{ClientError, ClientResult, Operation};
use validator::Validate;

use crate::{ApiClient, Credentials};

const SIGN_IN_PATH: &str = "/auth/signin";
const SIGN_UP_PATH: &str = "/auth/signup";
const RESTAURANTS_PATH: &str = "/menu/grouping/by/restaurant";
const PLANS_PATH: &str = "/subscription";
const MY_SUBSCRIPTIONS_PATH: &str = "/user/subscription";
const QUOTE_PATH: &str = "/order/calculate/total/price";
const ORDER_PATH: &str = "/order";

impl ApiClient {
    /// Sign in and, on success, keep the credentials in this client's session.
    pub async fn authenticate(&self, email: &str, password: &str) -> ClientResult<AccountResponse> {
        let request = SignInRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let details = self
            .post_json_anonymous(SIGN_IN_PATH, &request)
            .await
            .map_err(|err| {
                if err.status.is_some_and(|s| (400..500).contains(&s)) {
                    ClientError::AuthenticationFailed(format!("{:#}", err.source))
                } else {
                    err.into_client_error(Operation::Authenticate)
                }
            })?;

        self.session()
            .sign_in(Credentials::new(request.email.clone(), request.password));
        tracing::info!(email = %request.email, "signed in");
        Ok(AccountResponse { details })
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, request: &SignUpRequest) -> ClientResult<AccountResponse> {
        request.validate()?;
        let details = self
            .post_json_anonymous(SIGN_UP_PATH, request)
            .await
            .map_err(|err| err.into_client_error(Operation::Register))?;
        tracing::info!(email = %request.email, "registered account");
        Ok(AccountResponse { details })
    }

    /// Restaurants with their nested menus.
    pub async fn fetch_restaurants_with_menus(&self) -> ClientResult<Vec<RestaurantMenus>> {
        self.get(RESTAURANTS_PATH)
            .await
            .map_err(|err| err.into_client_error(Operation::FetchRestaurants))
    }

    /// Catalog of purchasable plans.
    pub async fn fetch_available_plans(&self) -> ClientResult<Vec<SubscriptionPlan>> {
        self.get(PLANS_PATH)
            .await
            .map_err(|err| err.into_client_error(Operation::FetchPlans))
    }

    /// The signed-in user's subscription records.
    pub async fn fetch_my_subscriptions(&self) -> ClientResult<Vec<UserSubscription>> {
        self.get(MY_SUBSCRIPTIONS_PATH)
            .await
            .map_err(|err| err.into_client_error(Operation::FetchMySubscriptions))
    }

    /// Buy a plan or renew one; the service tells them apart by the dates.
    pub async fn purchase_or_renew_subscription(
        &self,
        payload: &SubscriptionRequest,
    ) -> ClientResult<()> {
        self.post_json_lenient(MY_SUBSCRIPTIONS_PATH, payload)
            .await
            .map_err(|err| err.into_client_error(Operation::PurchaseOrRenewSubscription))?;
        tracing::info!(
            subscription_id = payload.subscription_id,
            start_date = %payload.start_date,
            end_date = %payload.end_date,
            "subscription purchased or renewed"
        );
        Ok(())
    }

    pub async fn delete_subscription(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("{}/id/{}", MY_SUBSCRIPTIONS_PATH, id))
            .await
            .map_err(|err| err.into_client_error(Operation::DeleteSubscription))?;
        tracing::info!(id, "subscription deleted");
        Ok(())
    }

    /// Ask the service to end a subscription immediately.
    pub async fn expire_subscription_now(&self, id: i64) -> ClientResult<()> {
        self.put_empty(&format!("{}/set/to/expire/{}", MY_SUBSCRIPTIONS_PATH, id))
            .await
            .map_err(|err| err.into_client_error(Operation::ExpireSubscription))?;
        tracing::info!(id, "subscription set to expire");
        Ok(())
    }

    /// Price breakdown for a candidate cart.
    pub async fn quote_price(&self, items: &[OrderItem]) -> ClientResult<PriceQuote> {
        let body = QuoteRequestBody {
            order_items: items.to_vec(),
        };
        self.post_json(QUOTE_PATH, &body)
            .await
            .map_err(|err| err.into_client_error(Operation::QuotePrice))
    }

    pub async fn submit_order(&self, payload: &OrderRequest) -> ClientResult<OrderConfirmation> {
        let details = self
            .post_json_lenient(ORDER_PATH, payload)
            .await
            .map_err(|err| err.into_client_error(Operation::SubmitOrder))?;
        tracing::info!(items = payload.order_items.len(), "order placed");
        Ok(OrderConfirmation { details })
    }
}

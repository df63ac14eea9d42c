//! Cart and pricing aggregation
//!
//! `CartAggregator` owns the cart, the order notes and the last price quote.
//! Cart mutations apply immediately and hand back a `QuoteRequest`; pricing
//! catches up when the matching `QuoteResponse` is applied. Every request
//! carries a token from a monotonic counter and only the newest token may
//! overwrite the displayed quote, so responses arriving out of order cannot
//! replace a newer price with a stale one.

use delivery_core::models::{MenuItem, OrderConfirmation, OrderItem, OrderRequest, PriceQuote};
use delivery_core::{Cart, ClientError, ClientResult};
use tracing::{debug, info, warn};

use crate::backend::OrderingApi;

/// A quote to fetch for the cart as it was when the request was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a quote request does nothing until it is fetched and applied"]
pub struct QuoteRequest {
    token: u64,
    items: Vec<OrderItem>,
}

impl QuoteRequest {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}

/// Result of a quote fetch, tagged with the token of its request.
#[derive(Debug)]
pub struct QuoteResponse {
    token: u64,
    result: ClientResult<PriceQuote>,
}

impl QuoteResponse {
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// What applying a `QuoteResponse` did to the displayed quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// The response was the newest one; its quote is now displayed.
    Applied(PriceQuote),
    /// A newer request was issued after this one; the response was dropped.
    Stale { token: u64, latest: u64 },
    /// The fetch failed; the previous quote stays displayed.
    Failed,
}

pub struct CartAggregator<P> {
    api: P,
    cart: Cart,
    notes: String,
    quote: PriceQuote,
    latest_token: u64,
}

impl<P: OrderingApi> CartAggregator<P> {
    pub fn new(api: P) -> Self {
        Self {
            api,
            cart: Cart::new(),
            notes: String::new(),
            quote: PriceQuote::zero(),
            latest_token: 0,
        }
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Quote currently displayed (may lag behind the cart).
    pub fn quote(&self) -> PriceQuote {
        self.quote
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// Add `quantity` units of `product` and request a fresh quote.
    ///
    /// A zero quantity changes nothing and issues no request. Products the
    /// restaurant marks unavailable are refused.
    pub fn add_item(
        &mut self,
        product: &MenuItem,
        quantity: u32,
    ) -> ClientResult<Option<QuoteRequest>> {
        if !product.is_available {
            return Err(ClientError::ValidationRejected(format!(
                "{} is not available right now",
                product.name
            )));
        }
        if !self.cart.add_item(product, quantity) {
            return Ok(None);
        }
        debug!(product_id = product.id, quantity, "added to cart");
        Ok(Some(self.issue_quote()))
    }

    /// Remove `product_id` from the cart and request a fresh quote.
    pub fn remove_item(&mut self, product_id: i64) -> Option<QuoteRequest> {
        if !self.cart.remove_item(product_id) {
            return None;
        }
        debug!(product_id, "removed from cart");
        Some(self.issue_quote())
    }

    /// Snapshot the cart into a new request, superseding all earlier ones.
    pub fn issue_quote(&mut self) -> QuoteRequest {
        self.latest_token += 1;
        QuoteRequest {
            token: self.latest_token,
            items: self.cart.order_items(),
        }
    }

    /// Ask the pricing service for `request`. Does not touch the displayed quote.
    pub async fn fetch_quote(&self, request: QuoteRequest) -> QuoteResponse {
        let result = self.api.quote_price(&request.items).await;
        QuoteResponse {
            token: request.token,
            result,
        }
    }

    /// Display the response's quote if it answers the newest request.
    pub fn apply_quote(&mut self, response: QuoteResponse) -> QuoteOutcome {
        if response.token != self.latest_token {
            debug!(
                token = response.token,
                latest = self.latest_token,
                "discarding stale quote"
            );
            return QuoteOutcome::Stale {
                token: response.token,
                latest: self.latest_token,
            };
        }
        match response.result {
            Ok(quote) => {
                self.quote = quote;
                QuoteOutcome::Applied(quote)
            }
            Err(err) => {
                warn!(error = %err, "price quote failed, keeping previous quote");
                QuoteOutcome::Failed
            }
        }
    }

    /// Issue, fetch and apply a quote for the current cart.
    pub async fn refresh_quote(&mut self) -> QuoteOutcome {
        let request = self.issue_quote();
        let response = self.fetch_quote(request).await;
        self.apply_quote(response)
    }

    /// Submit the cart with the current notes.
    ///
    /// On success the cart, notes and quote are reset and quotes still in
    /// flight become stale. On failure nothing changes so the user can retry.
    pub async fn place_order(&mut self) -> ClientResult<OrderConfirmation> {
        if self.cart.is_empty() {
            return Err(ClientError::ValidationRejected(
                "Cart is empty".to_string(),
            ));
        }

        let order = OrderRequest {
            mentions: self.notes.clone(),
            order_items: self.cart.order_items(),
        };
        let confirmation = self.api.submit_order(&order).await?;

        info!(
            items = order.order_items.len(),
            order_id = ?confirmation.order_id(),
            "order placed, clearing cart"
        );
        self.cart.clear();
        self.notes.clear();
        self.quote = PriceQuote::zero();
        self.latest_token += 1;
        Ok(confirmation)
    }
}

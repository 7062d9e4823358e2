//! BitX spot exchange integration.
//!
//! API docs: https://www.luno.com/en/developers/api
//! Base URL: https://api.mybitx.com/api/1
//! Auth: HTTP Basic with API key id / API key secret on every call.
//!
//! All amounts and prices are JSON strings on the wire and are parsed
//! straight into `Decimal` so no float rounding creeps into quotes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::Exchange;
use crate::types::{Balance, Order, OrderBook, OrderState, PriceLevel, Side};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://api.mybitx.com/api/1";
const EXCHANGE_NAME: &str = "bitx";

// ---------------------------------------------------------------------------
// API response types (BitX JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    balance: Vec<AccountBalance>,
}

#[derive(Debug, Deserialize)]
struct AccountBalance {
    asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    reserved: Decimal,
}

#[derive(Debug, Deserialize)]
struct OrderBookResponse {
    #[serde(default)]
    bids: Vec<BookEntry>,
    #[serde(default)]
    asks: Vec<BookEntry>,
}

#[derive(Debug, Deserialize)]
struct BookEntry {
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    volume: Decimal,
}

/// `/listorders` returns `"orders": null` when the account has none.
#[derive(Debug, Deserialize)]
struct ListOrdersResponse {
    #[serde(default)]
    orders: Option<Vec<BitxOrder>>,
}

#[derive(Debug, Deserialize)]
struct BitxOrder {
    order_id: String,
    /// Milliseconds since epoch.
    #[serde(default)]
    creation_timestamp: Option<i64>,
    #[serde(rename = "type")]
    order_type: String,
    state: String,
    #[serde(default, with = "rust_decimal::serde::str")]
    limit_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    limit_volume: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    base: Decimal,
    #[serde(default)]
    pair: String,
}

#[derive(Debug, Deserialize)]
struct PostOrderResponse {
    order_id: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    error_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// BitX REST client bound to one set of API credentials.
pub struct BitxClient {
    http: Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
}

impl BitxClient {
    /// Create a new client. `base_url` defaults to the production API.
    pub fn new(
        api_key: String,
        api_secret: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("market-maker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for BitX")?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            api_key,
            api_secret: SecretString::new(api_secret),
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "BitX GET");

        let resp = self
            .authed(self.http.get(&url))
            .send()
            .await
            .with_context(|| format!("BitX {what} request failed"))?;

        Self::parse(resp, what).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("BitX {what} failed {status}: {}", Self::describe_error(&body));
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse BitX {what} response"))
    }

    /// Prefer the API's structured error message over the raw body.
    fn describe_error(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                error,
                error_code: Some(code),
            }) => format!("{error} ({code})"),
            Ok(ApiErrorBody { error, .. }) => error,
            Err(_) => body.to_string(),
        }
    }

    fn ms_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(ms).single()
    }

    fn to_order(raw: BitxOrder) -> Result<Order> {
        let side = raw
            .order_type
            .parse::<Side>()
            .map_err(|e| anyhow::anyhow!("Order {}: {e}", raw.order_id))?;

        Ok(Order {
            id: raw.order_id,
            pair: raw.pair,
            side,
            state: OrderState::from_wire(&raw.state),
            price: raw.limit_price,
            volume: raw.limit_volume,
            filled_base: raw.base,
            created_at: raw.creation_timestamp.and_then(Self::ms_to_datetime),
        })
    }

    fn to_levels(entries: Vec<BookEntry>) -> Vec<PriceLevel> {
        entries
            .into_iter()
            .map(|e| PriceLevel {
                price: e.price,
                volume: e.volume,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Exchange trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Exchange for BitxClient {
    async fn balance(&self, asset: &str) -> Result<Balance> {
        let path = format!("/balance?assets={}", urlencoding::encode(asset));
        let resp: BalanceResponse = self.get_json(&path, "balance").await?;

        let account = resp
            .balance
            .into_iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
            .with_context(|| format!("No {asset} account on this API key"))?;

        Ok(Balance {
            available: account.balance,
            reserved: account.reserved,
        })
    }

    async fn order_book(&self, pair: &str) -> Result<OrderBook> {
        let path = format!("/orderbook?pair={}", urlencoding::encode(pair));
        let resp: OrderBookResponse = self.get_json(&path, "order book").await?;

        Ok(OrderBook {
            bids: Self::to_levels(resp.bids),
            asks: Self::to_levels(resp.asks),
        })
    }

    async fn list_orders(&self, pair: &str) -> Result<Vec<Order>> {
        let path = format!("/listorders?pair={}", urlencoding::encode(pair));
        let resp: ListOrdersResponse = self.get_json(&path, "list orders").await?;

        resp.orders
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_order)
            .collect()
    }

    async fn get_order(&self, order_id: &str) -> Result<Order> {
        let path = format!("/orders/{}", urlencoding::encode(order_id));
        let raw: BitxOrder = self.get_json(&path, "get order").await?;
        Self::to_order(raw)
    }

    async fn post_order(
        &self,
        pair: &str,
        side: Side,
        volume: Decimal,
        price: Decimal,
    ) -> Result<String> {
        let url = format!("{}/postorder", self.base_url);
        let volume = volume.to_string();
        let price = price.to_string();
        let form = [
            ("pair", pair),
            ("type", side.as_str()),
            ("volume", volume.as_str()),
            ("price", price.as_str()),
        ];

        debug!(url = %url, pair, side = %side, %volume, %price, "BitX POST");

        let resp = self
            .authed(self.http.post(&url))
            .form(&form)
            .send()
            .await
            .context("BitX post order request failed")?;

        let placed: PostOrderResponse = Self::parse(resp, "post order").await?;

        info!(order_id = %placed.order_id, pair, side = %side, %volume, %price, "BitX order placed");

        Ok(placed.order_id)
    }

    fn name(&self) -> &str {
        EXCHANGE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

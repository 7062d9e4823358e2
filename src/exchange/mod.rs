//! Exchange integration.
//!
//! Defines the `Exchange` trait, the only surface the engine uses to talk
//! to a venue, and provides the BitX REST implementation.

pub mod bitx;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{Balance, Order, OrderBook, Side};

/// Abstraction over a spot exchange account.
///
/// Implementors provide balance, book and order access for one account.
/// Every call is a single request; callers never issue two at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Available and reserved balance for an asset (e.g. `ZAR`).
    async fn balance(&self, asset: &str) -> Result<Balance>;

    /// Order book for a pair, best price first on each side.
    async fn order_book(&self, pair: &str) -> Result<OrderBook>;

    /// Orders on the account for a pair, most recent first.
    async fn list_orders(&self, pair: &str) -> Result<Vec<Order>>;

    /// Current state of a single order.
    async fn get_order(&self, order_id: &str) -> Result<Order>;

    /// Submit a limit order. Returns the exchange-assigned order id.
    async fn post_order(
        &self,
        pair: &str,
        side: Side,
        volume: Decimal,
        price: Decimal,
    ) -> Result<String>;

    /// Exchange name for logging and identification.
    fn name(&self) -> &str;
}

/// The asset whose balance gates trading on `pair`.
///
/// BitX pairs are quoted against bitcoin (`XBTZAR`); dropping the first
/// `XBT` leaves the counter asset.
pub fn balance_asset(pair: &str) -> String {
    pair.replacen("XBT", "", 1)
}

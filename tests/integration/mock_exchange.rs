//! Mock exchange for integration testing.
//!
//! Provides a deterministic `Exchange` implementation with an in-memory
//! order store, a fixed order book and a call log, with no network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use market_maker::exchange::Exchange;
use market_maker::types::*;

struct StoredOrder {
    order: Order,
    fetches: u32,
}

/// A mock spot exchange for deterministic testing.
///
/// Balance, book and orders are fully controllable from test code.
pub struct MockExchange {
    balance: Arc<Mutex<Balance>>,
    book: Arc<Mutex<OrderBook>>,
    orders: Arc<Mutex<Vec<StoredOrder>>>,
    calls: Arc<Mutex<Vec<String>>>,
    /// Orders read back after their first fetch report as filled.
    auto_fill: bool,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
    /// If set, only the named operation fails.
    fail_on: Arc<Mutex<Option<&'static str>>>,
}

impl MockExchange {
    pub fn new(available: Decimal, bid: Decimal, ask: Decimal) -> Self {
        Self {
            balance: Arc::new(Mutex::new(Balance {
                available,
                reserved: Decimal::ZERO,
            })),
            book: Arc::new(Mutex::new(Self::book(&[bid], &[ask]))),
            orders: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            auto_fill: false,
            force_error: Arc::new(Mutex::new(None)),
            fail_on: Arc::new(Mutex::new(None)),
        }
    }

    /// Every order placed fills before the next time it is looked at.
    pub fn filling(mut self) -> Self {
        self.auto_fill = true;
        self
    }

    /// Seed orders already on the account, oldest first.
    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        {
            let mut store = self.orders.lock().unwrap();
            store.extend(orders.into_iter().map(|order| StoredOrder { order, fetches: 0 }));
        }
        self
    }

    pub fn book(bids: &[Decimal], asks: &[Decimal]) -> OrderBook {
        let level = |price: &Decimal| PriceLevel {
            price: *price,
            volume: Decimal::ONE,
        };
        OrderBook {
            bids: bids.iter().map(level).collect(),
            asks: asks.iter().map(level).collect(),
        }
    }

    pub fn set_book(&self, book: OrderBook) {
        *self.book.lock().unwrap() = book;
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
        *self.fail_on.lock().unwrap() = None;
    }

    /// Fail only `operation` (e.g. `"get_order"`).
    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().unwrap() = Some(operation);
    }

    /// Names of the operations called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every order on the account, oldest first.
    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.order.clone())
            .collect()
    }

    pub fn complete(&self, order_id: &str) {
        let mut store = self.orders.lock().unwrap();
        if let Some(stored) = store.iter_mut().find(|s| s.order.id == order_id) {
            stored.order.state = OrderState::Complete;
            stored.order.filled_base = stored.order.volume;
        }
    }

    fn enter(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation.to_string());
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        if *self.fail_on.lock().unwrap() == Some(operation) {
            return Err(anyhow!("simulated {operation} failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Exchange for MockExchange {
    async fn balance(&self, _asset: &str) -> Result<Balance> {
        self.enter("balance")?;
        Ok(*self.balance.lock().unwrap())
    }

    async fn order_book(&self, _pair: &str) -> Result<OrderBook> {
        self.enter("order_book")?;
        Ok(self.book.lock().unwrap().clone())
    }

    async fn list_orders(&self, pair: &str) -> Result<Vec<Order>> {
        self.enter("list_orders")?;
        let store = self.orders.lock().unwrap();
        Ok(store
            .iter()
            .rev()
            .filter(|s| s.order.pair == pair)
            .map(|s| s.order.clone())
            .collect())
    }

    async fn get_order(&self, order_id: &str) -> Result<Order> {
        self.enter("get_order")?;
        let mut store = self.orders.lock().unwrap();
        let stored = store
            .iter_mut()
            .find(|s| s.order.id == order_id)
            .ok_or_else(|| anyhow!("Order not found: {order_id}"))?;

        if self.auto_fill && stored.fetches >= 1 {
            stored.order.state = OrderState::Complete;
            stored.order.filled_base = stored.order.volume;
        }
        stored.fetches += 1;

        Ok(stored.order.clone())
    }

    async fn post_order(
        &self,
        pair: &str,
        side: Side,
        volume: Decimal,
        price: Decimal,
    ) -> Result<String> {
        self.enter("post_order")?;
        if volume <= Decimal::ZERO {
            return Err(anyhow!("Invalid volume: {volume}"));
        }

        let order = Order {
            id: format!("MOCK-{}", Uuid::new_v4()),
            pair: pair.to_string(),
            side,
            state: OrderState::Open,
            price,
            volume,
            filled_base: Decimal::ZERO,
            created_at: Some(Utc::now()),
        };
        let id = order.id.clone();
        self.orders
            .lock()
            .unwrap()
            .push(StoredOrder { order, fetches: 0 });

        Ok(id)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_post_then_get() {
        let ex = MockExchange::new(dec!(1), dec!(100), dec!(102));
        let id = ex
            .post_order("XBTZAR", Side::Bid, dec!(0.0005), dec!(101))
            .await
            .unwrap();

        let order = ex.get_order(&id).await.unwrap();
        assert_eq!(order.side, Side::Bid);
        assert_eq!(order.price, dec!(101));
        assert_eq!(order.state, OrderState::Open);
    }

    #[tokio::test]
    async fn test_mock_auto_fill_on_second_fetch() {
        let ex = MockExchange::new(dec!(1), dec!(100), dec!(102)).filling();
        let id = ex
            .post_order("XBTZAR", Side::Bid, dec!(0.0005), dec!(101))
            .await
            .unwrap();

        assert_eq!(ex.get_order(&id).await.unwrap().state, OrderState::Open);
        assert_eq!(ex.get_order(&id).await.unwrap().state, OrderState::Complete);
    }

    #[tokio::test]
    async fn test_mock_list_orders_most_recent_first() {
        let ex = MockExchange::new(dec!(1), dec!(100), dec!(102));
        let first = ex
            .post_order("XBTZAR", Side::Bid, dec!(0.0005), dec!(101))
            .await
            .unwrap();
        let second = ex
            .post_order("XBTZAR", Side::Ask, dec!(0.0005), dec!(101))
            .await
            .unwrap();
        ex.post_order("XBTNGN", Side::Ask, dec!(0.0005), dec!(9))
            .await
            .unwrap();

        let listed = ex.list_orders("XBTZAR").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let ex = MockExchange::new(dec!(1), dec!(100), dec!(102));
        ex.set_error("simulated outage");

        assert!(ex.balance("ZAR").await.is_err());
        assert!(ex.order_book("XBTZAR").await.is_err());

        ex.clear_error();
        assert!(ex.balance("ZAR").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_fail_single_operation() {
        let ex = MockExchange::new(dec!(1), dec!(100), dec!(102));
        ex.fail_on("order_book");

        assert!(ex.order_book("XBTZAR").await.is_err());
        assert!(ex.balance("ZAR").await.is_ok());
        assert_eq!(ex.calls(), vec!["order_book", "balance"]);
    }
}

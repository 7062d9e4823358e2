//! Order alternation engine.
//!
//! Tracks the most recent order of the session and flips sides each time
//! it completes: a filled BID is followed by an ASK one tick inside the
//! best ask, anything else by a BID one tick inside the best bid.
//!
//! The engine holds no state of its own. Each round takes the last known
//! order (if any) and returns the order to carry into the next round.
//! At most one managed order per pair is assumed; when the account has
//! several, the first one the exchange lists is adopted.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::TradingConfig;
use crate::exchange::Exchange;
use crate::types::{MarketMakerError, MarketSnapshot, Order, Quote, Side};

// ---------------------------------------------------------------------------
// States & outcomes
// ---------------------------------------------------------------------------

/// Where the session stands relative to its last order, after refreshing it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    /// Nothing on the account for this pair yet.
    NoPriorOrder,
    /// The last order is not complete (still resting, or in some other state).
    OrderOpen(Order),
    /// The last order filled; time to quote the other side.
    OrderComplete(Order),
}

impl EngineState {
    fn from_order(order: Option<Order>) -> Self {
        match order {
            None => EngineState::NoPriorOrder,
            Some(o) if o.is_complete() => EngineState::OrderComplete(o),
            Some(o) => EngineState::OrderOpen(o),
        }
    }
}

/// Result of one alternation round.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Last order still open; nothing placed.
    Waiting(Order),
    /// A new order was submitted and re-fetched.
    Placed { quote: Quote, order: Order },
}

impl StepOutcome {
    /// The order to remember for the next round.
    pub fn last_order(&self) -> &Order {
        match self {
            StepOutcome::Waiting(order) => order,
            StepOutcome::Placed { order, .. } => order,
        }
    }

    pub fn into_last_order(self) -> Order {
        match self {
            StepOutcome::Waiting(order) => order,
            StepOutcome::Placed { order, .. } => order,
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, StepOutcome::Placed { .. })
    }
}

// ---------------------------------------------------------------------------
// Quoting
// ---------------------------------------------------------------------------

/// The order to place after `last` has completed (or when there is none).
pub fn next_quote(
    last: Option<&Order>,
    snapshot: &MarketSnapshot,
    tick: Decimal,
    volume: Decimal,
) -> Quote {
    let side = last.map_or(Side::Bid, |o| o.side.opposite());
    let price = match side {
        Side::Bid => snapshot.bid + tick,
        Side::Ask => snapshot.ask - tick,
    };
    Quote { side, price, volume }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Quoting parameters for one pair.
#[derive(Debug, Clone)]
pub struct AlternationEngine {
    pair: String,
    tick: Decimal,
    volume: Decimal,
}

impl AlternationEngine {
    pub fn new(pair: impl Into<String>, tick: Decimal, volume: Decimal) -> Self {
        Self {
            pair: pair.into(),
            tick,
            volume,
        }
    }

    pub fn from_config(cfg: &TradingConfig) -> Self {
        Self::new(cfg.pair.clone(), cfg.tick, cfg.order_volume)
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    /// Refresh the last order from the exchange, or adopt the account's
    /// first listed order when the session has none yet.
    pub async fn resolve_state(
        &self,
        exchange: &dyn Exchange,
        last: Option<Order>,
    ) -> Result<EngineState, MarketMakerError> {
        let current = match last {
            None => {
                info!(pair = %self.pair, "Fetching last order on account");
                let orders = exchange
                    .list_orders(&self.pair)
                    .await
                    .map_err(|e| MarketMakerError::transport("order listing", e))?;
                debug!(count = orders.len(), "Existing orders listed");
                orders.into_iter().next()
            }
            Some(order) => {
                info!(order_id = %order.id, "Refreshing last order");
                let refreshed = exchange
                    .get_order(&order.id)
                    .await
                    .map_err(|e| MarketMakerError::transport("order refresh", e))?;
                Some(refreshed)
            }
        };

        Ok(EngineState::from_order(current))
    }

    /// Run one round against the current market.
    pub async fn step(
        &self,
        exchange: &dyn Exchange,
        last: Option<Order>,
        snapshot: &MarketSnapshot,
    ) -> Result<StepOutcome, MarketMakerError> {
        let previous = match self.resolve_state(exchange, last).await? {
            EngineState::OrderOpen(order) => {
                info!(order = %order, "Order has not completed yet");
                return Ok(StepOutcome::Waiting(order));
            }
            EngineState::OrderComplete(order) => Some(order),
            EngineState::NoPriorOrder => None,
        };

        let quote = next_quote(previous.as_ref(), snapshot, self.tick, self.volume);
        let order = self.place(exchange, quote).await?;
        Ok(StepOutcome::Placed { quote, order })
    }

    /// Submit `quote` and re-fetch it by id for its authoritative state.
    ///
    /// If the re-fetch fails the order is live on the exchange but no
    /// longer tracked; the error still ends the session.
    async fn place(
        &self,
        exchange: &dyn Exchange,
        quote: Quote,
    ) -> Result<Order, MarketMakerError> {
        info!(pair = %self.pair, %quote, "Placing order");

        let order_id = exchange
            .post_order(&self.pair, quote.side, quote.volume, quote.price)
            .await
            .map_err(|e| MarketMakerError::transport("order placement", e))?;

        info!(order_id = %order_id, "Order placed, fetching details");

        exchange
            .get_order(&order_id)
            .await
            .map_err(|e| MarketMakerError::transport("placed order fetch", e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

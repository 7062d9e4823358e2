//! Shared types for the market maker.
//!
//! These types form the data model used across the exchange client, the
//! alternation engine and the session driver. Orders are owned by the
//! exchange; everything here is a read-only snapshot of remote state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Wire representation used by the exchange (`BID` / `ASK`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "BID",
            Side::Ask => "ASK",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BID" | "BUY" => Ok(Side::Bid),
            "ASK" | "SELL" => Ok(Side::Ask),
            other => Err(format!("Unknown order side: {other}")),
        }
    }
}

/// Lifecycle state of an order as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    /// Resting on the book (`PENDING` on the wire).
    Open,
    /// Fully filled.
    Complete,
    /// Any state this tool does not act on.
    Other,
}

impl OrderState {
    /// Map an exchange state string onto the states the engine cares about.
    pub fn from_wire(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PENDING" | "OPEN" => OrderState::Open,
            "COMPLETE" => OrderState::Complete,
            _ => OrderState::Other,
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderState::Open => write!(f, "OPEN"),
            OrderState::Complete => write!(f, "COMPLETE"),
            OrderState::Other => write!(f, "OTHER"),
        }
    }
}

// ---------------------------------------------------------------------------
// Account & market data
// ---------------------------------------------------------------------------

/// Account balance for a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub reserved: Decimal,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Reserved: {})", self.available, self.reserved)
    }
}

/// One price level of the order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub volume: Decimal,
}

/// Order book as returned by the exchange, best price first on each side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

/// Top of book at a point in time.
///
/// `spread` is always `ask - bid`. A crossed book yields a negative spread;
/// the feed is trusted and this is not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub bid: Decimal,
    pub ask: Decimal,
    pub spread: Decimal,
}

impl MarketSnapshot {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid,
            ask,
            spread: ask - bid,
        }
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spread: {}\n\tbid: {}\n\task: {}",
            self.spread, self.bid, self.ask
        )
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// A limit order on the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pair: String,
    pub side: Side,
    pub state: OrderState,
    pub price: Decimal,
    pub volume: Decimal,
    /// Base-currency amount filled so far.
    pub filled_base: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_complete(&self) -> bool {
        self.state == OrderState::Complete
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {} [{}] ({})",
            self.side, self.volume, self.pair, self.price, self.state, self.id,
        )
    }
}

/// A limit order about to be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub side: Side,
    pub price: Decimal,
    pub volume: Decimal,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {}, price: {}, volume: {}",
            self.side, self.price, self.volume
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Every way a session can fail. All of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum MarketMakerError {
    #[error("Please supply API key and secret (missing {0})")]
    AuthConfigMissing(&'static str),

    #[error("Error during {operation}: {cause:#}")]
    Transport {
        operation: &'static str,
        cause: anyhow::Error,
    },

    #[error("Not enough liquidity on market {pair}")]
    InsufficientLiquidity { pair: String },

    #[error("Insufficient balance to place an order: have {available}, need more than {minimum}")]
    InsufficientBalance { available: Decimal, minimum: Decimal },

    #[error("Could not get user confirmation: {0}")]
    InputRead(std::io::Error),
}

impl MarketMakerError {
    /// Wrap a collaborator failure, naming the operation that failed.
    pub fn transport(operation: &'static str, cause: anyhow::Error) -> Self {
        MarketMakerError::Transport { operation, cause }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Market snapshot reader.
//!
//! Reduces the order book to its best bid and ask. An empty side means
//! there is nothing to quote against and ends the session.

use tracing::debug;

use crate::exchange::Exchange;
use crate::types::{MarketMakerError, MarketSnapshot, OrderBook};

/// Fetch the book for `pair` and take the top of each side.
pub async fn read_snapshot(
    exchange: &dyn Exchange,
    pair: &str,
) -> Result<MarketSnapshot, MarketMakerError> {
    let book = exchange
        .order_book(pair)
        .await
        .map_err(|e| MarketMakerError::transport("order book fetch", e))?;

    let snapshot = snapshot_from_book(&book, pair)?;
    debug!(
        pair,
        bid = %snapshot.bid,
        ask = %snapshot.ask,
        spread = %snapshot.spread,
        "Market snapshot"
    );
    Ok(snapshot)
}

/// Top of book, or `InsufficientLiquidity` if either side is empty.
pub fn snapshot_from_book(book: &OrderBook, pair: &str) -> Result<MarketSnapshot, MarketMakerError> {
    match (book.best_bid(), book.best_ask()) {
        (Some(bid), Some(ask)) => Ok(MarketSnapshot::new(bid.price, ask.price)),
        _ => Err(MarketMakerError::InsufficientLiquidity {
            pair: pair.to_string(),
        }),
    }
}

//! Session driver.
//!
//! balance check → snapshot → confirm → alternate → confirm → repeat.
//! Every failure is returned to the caller, which ends the process; the
//! only way to stop cleanly is the operator answering no.

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::alternator::{AlternationEngine, StepOutcome};
use super::snapshot::read_snapshot;
use crate::config::TradingConfig;
use crate::console::ConfirmationGate;
use crate::exchange::{balance_asset, Exchange};
use crate::types::{Balance, MarketMakerError, MarketSnapshot, Order};

pub const WELCOME: &str = "Welcome to the BitX market-making trading bot!";
pub const FAREWELL: &str = "Bot finished working. Bye.";

const FIRST_QUESTION: &str = "Place trade?";
const NEXT_QUESTION: &str = "Place another trade if ready?";

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything carried from one round to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub last_order: Option<Order>,
    pub rounds: u32,
    pub orders_placed: u32,
}

impl SessionState {
    /// Fold one round's outcome into the next state.
    pub fn advance(self, outcome: StepOutcome) -> Self {
        let placed = u32::from(outcome.is_placement());
        Self {
            last_order: Some(outcome.into_last_order()),
            rounds: self.rounds + 1,
            orders_placed: self.orders_placed + placed,
        }
    }
}

/// How a session that ended cleanly went.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub balance: Balance,
    pub rounds: u32,
    pub orders_placed: u32,
    pub last_order: Option<Order>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session<'a, G: ConfirmationGate> {
    exchange: &'a dyn Exchange,
    gate: &'a mut G,
    engine: AlternationEngine,
    min_balance: Decimal,
}

impl<'a, G: ConfirmationGate> Session<'a, G> {
    pub fn new(exchange: &'a dyn Exchange, gate: &'a mut G, cfg: &TradingConfig) -> Self {
        Self {
            exchange,
            gate,
            engine: AlternationEngine::from_config(cfg),
            min_balance: cfg.min_balance,
        }
    }

    /// Drive the session until the operator declines or something fails.
    pub async fn run(&mut self) -> Result<SessionSummary, MarketMakerError> {
        let pair = self.engine.pair().to_string();
        self.gate.report(WELCOME);

        let balance = self.check_balance().await?;
        let mut snapshot = self.snapshot().await?;

        let mut state = SessionState::default();
        let mut go = self.gate.confirm(FIRST_QUESTION)?;

        while go {
            let outcome = self
                .engine
                .step(self.exchange, state.last_order.take(), &snapshot)
                .await?;
            self.report_outcome(&outcome);
            state = state.advance(outcome);

            go = self.gate.confirm(NEXT_QUESTION)?;
            if go {
                snapshot = self.snapshot().await?;
            }
        }

        self.gate.report(FAREWELL);
        info!(
            pair = %pair,
            rounds = state.rounds,
            orders_placed = state.orders_placed,
            "Session finished"
        );

        Ok(SessionSummary {
            balance,
            rounds: state.rounds,
            orders_placed: state.orders_placed,
            last_order: state.last_order,
        })
    }

    /// Fetch the counter-asset balance and refuse to trade at or below
    /// the configured minimum.
    pub async fn check_balance(&mut self) -> Result<Balance, MarketMakerError> {
        let asset = balance_asset(self.engine.pair());
        let balance = self
            .exchange
            .balance(&asset)
            .await
            .map_err(|e| MarketMakerError::transport("balance fetch", e))?;

        self.gate.report(&format!("Current balance: {balance}"));
        info!(
            asset = %asset,
            available = %balance.available,
            reserved = %balance.reserved,
            "Balance fetched"
        );

        if balance.available <= self.min_balance {
            warn!(
                available = %balance.available,
                minimum = %self.min_balance,
                "Balance below trading minimum"
            );
            return Err(MarketMakerError::InsufficientBalance {
                available: balance.available,
                minimum: self.min_balance,
            });
        }

        Ok(balance)
    }

    async fn snapshot(&mut self) -> Result<MarketSnapshot, MarketMakerError> {
        let snapshot = read_snapshot(self.exchange, self.engine.pair()).await?;
        self.gate.report(&format!("Current market\n\t{snapshot}"));
        Ok(snapshot)
    }

    fn report_outcome(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Waiting(order) => {
                self.gate.report(&format!("Last order: {order}"));
                self.gate.report("Order has not completed yet.");
            }
            StepOutcome::Placed { quote, order } => {
                self.gate.report(&format!("Placed order of {quote}"));
                self.gate.report(&format!("Order details: {order}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

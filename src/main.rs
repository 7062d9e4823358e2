//! Interactive BitX market maker.
//!
//! Entry point. Parses flags, loads configuration, initialises structured
//! logging and runs one supervised session. Any failure exits non-zero.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

use market_maker::cli::Cli;
use market_maker::console::ConsoleGate;
use market_maker::engine::session::Session;
use market_maker::exchange::bitx::BitxClient;
use market_maker::exchange::Exchange;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let credentials = cli.credentials()?;
    let cfg = cli.resolve_config()?;

    let client = BitxClient::new(
        credentials.api_key,
        credentials.api_secret,
        Some(cfg.exchange.base_url.clone()),
        cfg.exchange.timeout(),
    )?;

    info!(
        exchange = client.name(),
        pair = %cfg.trading.pair,
        volume = %cfg.trading.order_volume,
        tick = %cfg.trading.tick,
        "Starting market-making session"
    );

    let mut gate = ConsoleGate::stdio();
    let summary = Session::new(&client, &mut gate, &cfg.trading).run().await?;

    info!(
        available = %summary.balance.available,
        reserved = %summary.balance.reserved,
        rounds = summary.rounds,
        orders_placed = summary.orders_placed,
        last_order = ?summary.last_order.as_ref().map(|o| o.id.as_str()),
        "Market maker shut down cleanly"
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_maker=info"));

    let json_logging = std::env::var("MARKET_MAKER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

//! Configuration loading from TOML.
//!
//! Reads `config.toml` if present and deserializes into strongly-typed
//! structs; every field has a default so the file is optional. API
//! credentials never live here, they come from flags or the environment.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::exchange::bitx::DEFAULT_BASE_URL;

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub trading: TradingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ExchangeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Quoting parameters for the session.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TradingConfig {
    /// Market identifier, e.g. `XBTZAR`.
    pub pair: String,
    /// Base-currency volume of every order.
    pub order_volume: Decimal,
    /// Price offset used to step inside the best bid/ask.
    pub tick: Decimal,
    /// Balance at or below which no session is started.
    pub min_balance: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            pair: "XBTZAR".to_string(),
            order_volume: dec!(0.0005),
            tick: dec!(1),
            min_balance: dec!(0.005),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject trading parameters that would put bad orders on the book.
    pub fn validate(&self) -> Result<()> {
        let t = &self.trading;
        if t.pair.trim().is_empty() {
            anyhow::bail!("trading.pair must not be empty");
        }
        if t.order_volume <= Decimal::ZERO {
            anyhow::bail!("trading.order_volume must be positive, got {}", t.order_volume);
        }
        if t.tick < Decimal::ZERO {
            anyhow::bail!("trading.tick must not be negative, got {}", t.tick);
        }
        Ok(())
    }
}

//! Command-line surface.
//!
//! Credentials may come from flags or from `BITX_API_KEY` /
//! `BITX_API_SECRET` (a `.env` file is loaded first). Trading flags
//! override the values from the config file.

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::types::MarketMakerError;

/// Interactive market maker for a single BitX pair.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key id.
    #[arg(long, env = "BITX_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API key secret.
    #[arg(long, env = "BITX_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Pair to trade (e.g. "XBTZAR"). Defaults to the config file value.
    #[arg(long)]
    pub currency_pair: Option<String>,

    /// Path to the TOML config file. Must exist when given; without it
    /// `config.toml` is used if present, defaults otherwise.
    #[arg(long)]
    pub config: Option<String>,

    /// Base-currency volume of every order.
    #[arg(long)]
    pub volume: Option<Decimal>,

    /// Price offset inside the best bid/ask.
    #[arg(long)]
    pub tick: Option<Decimal>,
}

/// API credentials, both present.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Cli {
    /// Both key and secret, or `AuthConfigMissing` naming what is absent.
    pub fn credentials(&self) -> Result<Credentials, MarketMakerError> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(String::from);

        let api_key = present(&self.api_key).ok_or(MarketMakerError::AuthConfigMissing("api key"))?;
        let api_secret =
            present(&self.api_secret).ok_or(MarketMakerError::AuthConfigMissing("api secret"))?;

        Ok(Credentials { api_key, api_secret })
    }

    /// Load the config file, apply flag overrides and validate the result.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let file = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
        };
        let cfg = self.apply(file);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply trading overrides on top of the loaded config.
    pub fn apply(&self, mut cfg: AppConfig) -> AppConfig {
        if let Some(pair) = &self.currency_pair {
            cfg.trading.pair = pair.clone();
        }
        if let Some(volume) = self.volume {
            cfg.trading.order_volume = volume;
        }
        if let Some(tick) = self.tick {
            cfg.trading.tick = tick;
        }
        cfg
    }
}

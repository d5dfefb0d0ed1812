use std::net::SocketAddr;

use anyhow::{bail, Context};

use tokex_types::ids::Symbol;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_PAIRS: &str = "AAPL/USD,TSLA/USD,MSFT/USD";
const DEFAULT_DEPTH_CAP: usize = 50;
const DEFAULT_CANDLE_HISTORY: usize = 1000;

/// Gateway configuration, read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub symbols: Vec<Symbol>,
    /// Upper bound on orderbook depth a single request may ask for
    pub depth_cap: usize,
    /// Sealed candles retained per (symbol, interval)
    pub candle_history: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("TOKEX_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .context("TOKEX_BIND is not a valid socket address")?;

        let jwt_secret =
            std::env::var("TOKEX_JWT_SECRET").context("TOKEX_JWT_SECRET must be set")?;

        let pairs = std::env::var("TOKEX_PAIRS").unwrap_or_else(|_| DEFAULT_PAIRS.to_string());
        let mut symbols = Vec::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match Symbol::try_new(pair) {
                Some(symbol) => symbols.push(symbol),
                None => bail!("TOKEX_PAIRS entry {pair:?} is not BASE/QUOTE shaped"),
            }
        }
        if symbols.is_empty() {
            bail!("TOKEX_PAIRS configured no trading pairs");
        }

        let depth_cap = match std::env::var("TOKEX_DEPTH_CAP") {
            Ok(raw) => raw.parse().context("TOKEX_DEPTH_CAP is not a number")?,
            Err(_) => DEFAULT_DEPTH_CAP,
        };
        let candle_history = match std::env::var("TOKEX_CANDLE_HISTORY") {
            Ok(raw) => raw.parse().context("TOKEX_CANDLE_HISTORY is not a number")?,
            Err(_) => DEFAULT_CANDLE_HISTORY,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            symbols,
            depth_cap,
            candle_history,
        })
    }
}

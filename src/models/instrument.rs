use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable market, e.g. `KRW-SOL` displayed as `SOL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub market: String,
    pub symbol: String,
}

impl Instrument {
    /// Build from an exchange-qualified market code (`QUOTE-BASE`).
    pub fn from_market(market: &str) -> Self {
        let symbol = market
            .split_once('-')
            .map(|(_, base)| base)
            .unwrap_or(market)
            .to_string();
        Self {
            market: market.to_string(),
            symbol,
        }
    }

    pub fn chart_url(&self) -> String {
        format!("https://upbit.com/exchange?code=CRIX.UPBIT.{}", self.market)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.market)
    }
}

/// 24h snapshot used for universe ranking and current prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub market: String,
    pub trade_price: f64,
    pub acc_trade_price_24h: f64,
}

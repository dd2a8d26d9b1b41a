pub mod universe;
pub mod upbit;

pub use universe::Universe;
pub use upbit::UpbitClient;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::{CandleSeries, Instrument, Ticker, Timeframe};

#[async_trait]
pub trait MarketData: Send + Sync {
    /// Every market quoted in `quote_currency`.
    async fn list_instruments(&mut self, quote_currency: &str) -> Result<Vec<Instrument>>;

    /// Latest price and 24h turnover. Unknown markets are simply absent.
    async fn tickers(&mut self, instruments: &[Instrument]) -> Result<Vec<Ticker>>;

    /// Oldest-first bars, or `None` when the source has nothing for the market.
    async fn recent_bars(
        &mut self,
        instrument: &Instrument,
        interval: Timeframe,
        count: usize,
    ) -> Result<Option<CandleSeries>>;

    /// market -> latest price. May omit entries.
    async fn current_prices(&mut self, instruments: &[Instrument]) -> Result<HashMap<String, f64>> {
        Ok(self
            .tickers(instruments)
            .await?
            .into_iter()
            .map(|t| (t.market, t.trade_price))
            .collect())
    }
}

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::exchange::MarketData;
use crate::models::Instrument;

/// Parameters the cached selection was computed with.
#[derive(Debug, Clone, PartialEq)]
struct SelectionKey {
    quote_currency: String,
    min_price: f64,
    blacklist: Vec<String>,
    size: usize,
}

impl SelectionKey {
    fn from_config(cfg: &Config) -> Self {
        let mut blacklist = cfg.blacklist.clone();
        blacklist.sort();
        Self {
            quote_currency: cfg.quote_currency.clone(),
            min_price: cfg.min_price,
            blacklist,
            size: cfg.universe_size,
        }
    }
}

/// Watched set: top markets by 24h turnover, cached for a while.
#[derive(Debug, Default)]
pub struct Universe {
    instruments: Vec<Instrument>,
    fetched_at: Option<DateTime<Utc>>,
    key: Option<SelectionKey>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    fn is_fresh(&self, key: &SelectionKey, ttl: Duration, now: DateTime<Utc>) -> bool {
        match (&self.key, self.fetched_at) {
            (Some(k), Some(at)) => k == key && now - at < ttl,
            _ => false,
        }
    }

    /// Refetch when stale or when the selection parameters changed. On
    /// failure the previous set (possibly empty) is kept and the next call
    /// retries.
    pub async fn refresh(
        &mut self,
        market: &mut dyn MarketData,
        cfg: &Config,
        now: DateTime<Utc>,
    ) -> &[Instrument] {
        let key = SelectionKey::from_config(cfg);
        let ttl = Duration::seconds(cfg.universe_ttl_secs as i64);
        if self.is_fresh(&key, ttl, now) {
            return &self.instruments;
        }

        match select_top(market, cfg).await {
            Ok(selected) => {
                info!(
                    "Universe: {} markets (quote={}, min_price={}, excluded={})",
                    selected.len(),
                    cfg.quote_currency,
                    cfg.min_price,
                    cfg.blacklist.len()
                );
                self.instruments = selected;
                self.fetched_at = Some(now);
                self.key = Some(key);
            }
            Err(e) => {
                warn!(
                    "Universe fetch failed, keeping {} cached markets: {:#}",
                    self.instruments.len(),
                    e
                );
            }
        }
        &self.instruments
    }
}

/// Non-blacklisted markets priced at or above `min_price`, ranked by 24h
/// turnover, top `universe_size`.
pub async fn select_top(market: &mut dyn MarketData, cfg: &Config) -> Result<Vec<Instrument>> {
    let candidates: Vec<Instrument> = market
        .list_instruments(&cfg.quote_currency)
        .await?
        .into_iter()
        .filter(|i| !cfg.is_blacklisted(&i.market))
        .collect();

    let mut tickers = market.tickers(&candidates).await?;
    tickers.retain(|t| t.trade_price >= cfg.min_price);
    tickers.sort_by(|a, b| b.acc_trade_price_24h.total_cmp(&a.acc_trade_price_24h));

    Ok(tickers
        .into_iter()
        .take(cfg.universe_size)
        .map(|t| Instrument::from_market(&t.market))
        .collect())
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::exchange::MarketData;
use crate::models::{Candle, CandleSeries, Instrument, Ticker, Timeframe};

const BASE_URL: &str = "https://api.upbit.com";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);
const MAX_MARKETS_PER_TICKER_REQUEST: usize = 100;
const MAX_CANDLES_PER_REQUEST: usize = 200;

#[derive(Debug, Deserialize)]
struct RawMarket {
    market: String,
}

#[derive(Debug, Deserialize)]
struct RawTicker {
    market: String,
    trade_price: f64,
    acc_trade_price_24h: f64,
}

#[derive(Debug, Deserialize)]
struct RawCandle {
    candle_date_time_utc: String,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_volume: f64,
}

/// Public quotation API client. No credentials needed.
pub struct UpbitClient {
    client: Client,
    base_url: String,
    last_request: Option<Instant>,
}

impl UpbitClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            last_request: None,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &mut self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limit().await;

        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", path))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Upbit API error {} on {}: {}", status, path, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse {} response", path))
    }

    pub async fn fetch_markets(&mut self, quote_currency: &str) -> Result<Vec<Instrument>> {
        let raw: Vec<RawMarket> = self
            .get_json("/v1/market/all", &[("isDetails", "false".to_string())])
            .await?;

        let prefix = format!("{}-", quote_currency);
        Ok(raw
            .into_iter()
            .filter(|m| m.market.starts_with(&prefix))
            .map(|m| Instrument::from_market(&m.market))
            .collect())
    }

    pub async fn fetch_tickers(&mut self, instruments: &[Instrument]) -> Result<Vec<Ticker>> {
        let mut tickers = Vec::with_capacity(instruments.len());
        for chunk in instruments.chunks(MAX_MARKETS_PER_TICKER_REQUEST) {
            let markets: Vec<&str> = chunk.iter().map(|i| i.market.as_str()).collect();
            let raw: Vec<RawTicker> = self
                .get_json("/v1/ticker", &[("markets", markets.join(","))])
                .await?;
            tickers.extend(raw.into_iter().map(|t| Ticker {
                market: t.market,
                trade_price: t.trade_price,
                acc_trade_price_24h: t.acc_trade_price_24h,
            }));
        }
        Ok(tickers)
    }

    pub async fn fetch_candles(
        &mut self,
        instrument: &Instrument,
        interval: Timeframe,
        count: usize,
    ) -> Result<Option<CandleSeries>> {
        let path = format!("/v1/candles/minutes/{}", interval.minute_unit());
        let raw: Vec<RawCandle> = self
            .get_json(
                &path,
                &[
                    ("market", instrument.market.clone()),
                    ("count", count.min(MAX_CANDLES_PER_REQUEST).to_string()),
                ],
            )
            .await?;

        if raw.is_empty() {
            return Ok(None);
        }

        let mut candles: Vec<Candle> = raw
            .into_iter()
            .filter_map(|rc| {
                let ts = NaiveDateTime::parse_from_str(&rc.candle_date_time_utc, "%Y-%m-%dT%H:%M:%S")
                    .ok()?
                    .and_utc();
                Some(Candle {
                    timestamp: ts,
                    open: rc.opening_price,
                    high: rc.high_price,
                    low: rc.low_price,
                    close: rc.trade_price,
                    volume: rc.candle_acc_trade_volume,
                })
            })
            .collect();

        // Newest first on the wire
        candles.sort_by_key(|c| c.timestamp);

        Ok(Some(CandleSeries::new(candles)))
    }
}

#[async_trait]
impl MarketData for UpbitClient {
    async fn list_instruments(&mut self, quote_currency: &str) -> Result<Vec<Instrument>> {
        self.fetch_markets(quote_currency).await
    }

    async fn tickers(&mut self, instruments: &[Instrument]) -> Result<Vec<Ticker>> {
        self.fetch_tickers(instruments).await
    }

    async fn recent_bars(
        &mut self,
        instrument: &Instrument,
        interval: Timeframe,
        count: usize,
    ) -> Result<Option<CandleSeries>> {
        self.fetch_candles(instrument, interval, count).await
    }
}

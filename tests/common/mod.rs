#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use whale_scanner::config::{Config, Preset};
use whale_scanner::exchange::MarketData;
use whale_scanner::models::{Candle, CandleSeries, Instrument, Ticker, Timeframe};
use whale_scanner::notify::Notifier;

/// Bars following `closes`, each opening at the previous close.
pub fn bars_from_closes(closes: &[f64], volume: f64) -> CandleSeries {
    let base = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let mut prev = closes.first().copied().unwrap_or(0.0);

    let candles: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// Steady slide then a sharp rebound: deep RSI, fast MA turning up.
pub fn oversold_bounce(volume: f64) -> CandleSeries {
    let mut closes: Vec<f64> = (0..39).map(|i| 1_000.0 - i as f64 * 10.0).collect();
    closes.push(closes[38] + 45.0);
    bars_from_closes(&closes, volume)
}

/// Flat, rally, then a 4-bar pullback: RSI about 41, fast MA above slow.
pub fn pullback_in_uptrend(volume: f64) -> CandleSeries {
    let mut closes = vec![1_000.0; 26];
    closes.extend((0..10).map(|i| 1_000.0 + i as f64 * 10.0));
    closes.extend([1_070.0, 1_050.0, 1_030.0, 1_010.0]);
    bars_from_closes(&closes, volume)
}

pub fn test_config() -> Config {
    Config {
        preset: Preset::QuietMarket,
        use_golden_cross: false,
        rsi_threshold: 45.0,
        turnover_floor: 150.0,
        min_probability: 50,
        take_profit_pct: 2.0,
        stop_loss_pct: 1.5,
        quote_currency: "KRW".to_string(),
        universe_size: 100,
        min_price: 10.0,
        blacklist: vec!["KRW-BTC".to_string(), "KRW-ETH".to_string()],
        universe_ttl_secs: 600,
        candle_interval: Timeframe::M1,
        candle_count: 40,
        request_timeout_secs: 5,
        instrument_delay_ms: 0,
        scan_interval_ms: 0,
        cooldown_secs: 300,
        retention_secs: 600,
        history_capacity: 1000,
        discord_webhook_url: None,
        log_level: "ERROR".to_string(),
    }
}

/// Canned exchange. Prices and listing failures can be changed between passes.
pub struct MockMarket {
    tickers: Vec<Ticker>,
    bars: HashMap<String, CandleSeries>,
    prices: Arc<Mutex<HashMap<String, f64>>>,
    listing_down: Arc<AtomicBool>,
}

impl MockMarket {
    pub fn new() -> Self {
        Self {
            tickers: Vec::new(),
            bars: HashMap::new(),
            prices: Arc::new(Mutex::new(HashMap::new())),
            listing_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// List a market with 24h turnover; `bars = None` means no candle data.
    pub fn with_market(
        mut self,
        market: &str,
        price: Option<f64>,
        turnover_24h: f64,
        bars: Option<CandleSeries>,
    ) -> Self {
        self.tickers.push(Ticker {
            market: market.to_string(),
            trade_price: price.unwrap_or(1_000.0),
            acc_trade_price_24h: turnover_24h,
        });
        if let Some(b) = bars {
            self.bars.insert(market.to_string(), b);
        }
        if let Some(p) = price {
            self.prices.lock().unwrap().insert(market.to_string(), p);
        }
        self
    }

    pub fn prices(&self) -> Arc<Mutex<HashMap<String, f64>>> {
        Arc::clone(&self.prices)
    }

    pub fn listing_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.listing_down)
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn list_instruments(&mut self, quote_currency: &str) -> Result<Vec<Instrument>> {
        if self.listing_down.load(Ordering::SeqCst) {
            anyhow::bail!("listing endpoint unavailable");
        }
        let prefix = format!("{}-", quote_currency);
        Ok(self
            .tickers
            .iter()
            .filter(|t| t.market.starts_with(&prefix))
            .map(|t| Instrument::from_market(&t.market))
            .collect())
    }

    async fn tickers(&mut self, instruments: &[Instrument]) -> Result<Vec<Ticker>> {
        Ok(self
            .tickers
            .iter()
            .filter(|t| instruments.iter().any(|i| i.market == t.market))
            .cloned()
            .collect())
    }

    async fn recent_bars(
        &mut self,
        instrument: &Instrument,
        _interval: Timeframe,
        _count: usize,
    ) -> Result<Option<CandleSeries>> {
        Ok(self.bars.get(&instrument.market).cloned())
    }

    async fn current_prices(&mut self, _instruments: &[Instrument]) -> Result<HashMap<String, f64>> {
        Ok(self.prices.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

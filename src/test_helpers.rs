use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{Config, Preset};
use crate::core::IndicatorSnapshot;
use crate::exchange::MarketData;
use crate::models::{Candle, CandleSeries, Instrument, Signal, SignalState, Ticker, Timeframe};
use crate::notify::Notifier;

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Create candles from (open, high, low, close) tuples with auto-incrementing 1m timestamps.
pub fn make_candles(data: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let base = base_time();

    let candles: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle {
            timestamp: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        })
        .collect();

    CandleSeries::new(candles)
}

/// Create n rising (bullish) candles starting from `start` price.
pub fn make_bullish_trend(n: usize, start: f64) -> CandleSeries {
    let base = base_time();

    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start + i as f64 * 10.0;
            let close = open + 8.0;
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: close + 2.0,
                low: open - 1.0,
                close,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// Create n falling (bearish) candles starting from `start` price.
pub fn make_bearish_trend(n: usize, start: f64) -> CandleSeries {
    let base = base_time();

    let candles: Vec<Candle> = (0..n)
        .map(|i| {
            let open = start - i as f64 * 10.0;
            let close = open - 8.0;
            Candle {
                timestamp: base + Duration::minutes(i as i64),
                open,
                high: open + 1.0,
                low: close - 2.0,
                close,
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// Bars whose closes follow `closes` exactly; open is the previous close.
pub fn make_closes(closes: &[f64]) -> CandleSeries {
    let base = base_time();
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
                volume: 100.0,
            }
        })
        .collect();

    CandleSeries::new(candles)
}

/// 39 bars sliding 10 per bar from `start`, then one +45 rebound bar.
///
/// With `start = 1000` and heavy volume this passes the default test filter
/// (RSI about 25.7, fast MA turning up) and scores exactly 50.
pub fn oversold_bounce(start: f64, volume: f64) -> CandleSeries {
    let mut closes: Vec<f64> = (0..39).map(|i| start - i as f64 * 10.0).collect();
    let last = closes[closes.len() - 1] + 45.0;
    closes.push(last);

    let base = base_time();
    let mut prev = start;
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

pub fn snapshot(
    rsi: f64,
    ma_fast: f64,
    ma_fast_prev: f64,
    ma_slow: f64,
    ma_slow_prev: f64,
) -> IndicatorSnapshot {
    IndicatorSnapshot {
        rsi,
        ma_fast,
        ma_fast_prev,
        ma_slow,
        ma_slow_prev,
        avg_range: 1.0,
    }
}

/// A WATCHING signal with explicit levels.
pub fn make_signal(
    market: &str,
    entry: f64,
    take_profit: f64,
    stop_loss: f64,
    created_at: DateTime<Utc>,
) -> Signal {
    let instrument = Instrument::from_market(market);
    Signal {
        id: 0,
        market: instrument.market.clone(),
        symbol: instrument.symbol.clone(),
        detected_at: created_at,
        entry_price: entry,
        rsi: 40.0,
        score: 80,
        take_profit,
        stop_loss,
        take_profit_pct: (take_profit - entry) / entry * 100.0,
        stop_loss_pct: (stop_loss - entry) / entry * 100.0,
        state: SignalState::Watching,
        chart_url: instrument.chart_url(),
        created_at,
        exit_price: None,
        resolved_at: None,
    }
}

/// A Config suitable for testing: quiet-market thresholds, no pacing delays, no webhook.
pub fn default_test_config() -> Config {
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
        blacklist: ["KRW-BTC", "KRW-ETH", "KRW-XRP", "KRW-USDT"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
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

/// In-memory market: fixed listing and bars, adjustable live prices.
pub struct StaticMarket {
    tickers: Vec<Ticker>,
    bars: HashMap<String, CandleSeries>,
    prices: Arc<Mutex<HashMap<String, f64>>>,
}

impl StaticMarket {
    pub fn new() -> Self {
        Self {
            tickers: Vec::new(),
            bars: HashMap::new(),
            prices: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_market(mut self, market: &str, price: f64, turnover_24h: f64, bars: CandleSeries) -> Self {
        self.tickers.push(Ticker {
            market: market.to_string(),
            trade_price: price,
            acc_trade_price_24h: turnover_24h,
        });
        self.bars.insert(market.to_string(), bars);
        self.prices.lock().unwrap().insert(market.to_string(), price);
        self
    }

    pub fn prices_handle(&self) -> Arc<Mutex<HashMap<String, f64>>> {
        Arc::clone(&self.prices)
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    async fn list_instruments(&mut self, quote_currency: &str) -> Result<Vec<Instrument>> {
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

/// Captures every notification text.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.messages)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

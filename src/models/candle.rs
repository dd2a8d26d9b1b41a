use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn total_range(&self) -> f64 {
        self.high - self.low
    }

    /// All prices finite and positive, volume finite and non-negative, high >= low.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.low
    }
}

/// Oldest-first window of candles for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Mean of (high - low) over the trailing `n` candles.
    pub fn mean_range(&self, n: usize) -> Option<f64> {
        let start = self.candles.len().saturating_sub(n);
        let window = &self.candles[start..];
        if window.is_empty() {
            return None;
        }
        let sum: f64 = window.iter().map(Candle::total_range).sum();
        Some(sum / window.len() as f64)
    }

    pub fn is_well_formed(&self) -> bool {
        self.candles.iter().all(Candle::is_well_formed)
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    /// Keep only the newest `max_len` candles.
    pub fn truncate_front(&mut self, max_len: usize) {
        if self.candles.len() > max_len {
            let excess = self.candles.len() - max_len;
            self.candles.drain(..excess);
        }
    }
}

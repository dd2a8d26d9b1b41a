use serde::{Deserialize, Serialize};

use crate::models::CandleSeries;

pub const RSI_PERIOD: usize = 14;
pub const FAST_MA: usize = 5;
pub const SLOW_MA: usize = 20;
pub const RANGE_LOOKBACK: usize = 10;
/// Slow MA on the latest and the prior bar needs SLOW_MA + 1 closes.
pub const MIN_BARS: usize = SLOW_MA + 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ma_fast: f64,
    pub ma_fast_prev: f64,
    pub ma_slow: f64,
    pub ma_slow_prev: f64,
    pub avg_range: f64,
}

impl IndicatorSnapshot {
    /// Strict upward cross of the fast MA over the slow MA on the latest bar.
    pub fn is_golden_cross(&self) -> bool {
        self.ma_fast_prev <= self.ma_slow_prev && self.ma_fast > self.ma_slow
    }

    pub fn is_finite(&self) -> bool {
        [
            self.rsi,
            self.ma_fast,
            self.ma_fast_prev,
            self.ma_slow,
            self.ma_slow_prev,
            self.avg_range,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Derive the snapshot from an oldest-first window. Abstains below `MIN_BARS`.
pub fn compute(candles: &CandleSeries) -> Option<IndicatorSnapshot> {
    if candles.len() < MIN_BARS {
        return None;
    }
    let closes = candles.closes();

    Some(IndicatorSnapshot {
        rsi: wilder_rsi(&closes, RSI_PERIOD)?,
        ma_fast: sma_at(&closes, FAST_MA, 0)?,
        ma_fast_prev: sma_at(&closes, FAST_MA, 1)?,
        ma_slow: sma_at(&closes, SLOW_MA, 0)?,
        ma_slow_prev: sma_at(&closes, SLOW_MA, 1)?,
        avg_range: candles.mean_range(RANGE_LOOKBACK)?,
    })
}

/// Simple mean of `period` closes ending `offset` bars before the latest.
pub fn sma_at(closes: &[f64], period: usize, offset: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + offset {
        return None;
    }
    let end = closes.len() - offset;
    let window = &closes[end - period..end];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Latest RSI value with Wilder smoothing: the first average is a plain mean
/// over `period` changes, later ones are `(prev * (period - 1) + x) / period`.
pub fn wilder_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = changes.split_at(period);

    let mut avg_gain = seed.iter().map(|c| c.max(0.0)).sum::<f64>() / period as f64;
    let mut avg_loss = seed.iter().map(|c| (-c).max(0.0)).sum::<f64>() / period as f64;

    let n = period as f64;
    for change in rest {
        avg_gain = (avg_gain * (n - 1.0) + change.max(0.0)) / n;
        avg_loss = (avg_loss * (n - 1.0) + (-change).max(0.0)) / n;
    }

    if avg_loss == 0.0 {
        // Flat window reads as neutral
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

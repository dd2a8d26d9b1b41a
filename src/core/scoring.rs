use crate::core::indicators::IndicatorSnapshot;

const VOLUME_POINTS_PER_RATIO: f64 = 10.0;
const VOLUME_CAP: f64 = 40.0;
const RSI_SWEET_SPOT: (f64, f64) = (35.0, 55.0);
const RSI_WARM_MAX: f64 = 65.0;
const RSI_SWEET_POINTS: f64 = 30.0;
const RSI_WARM_POINTS: f64 = 15.0;
const TREND_UP_POINTS: f64 = 30.0;
const TREND_RISING_POINTS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub volume: f64,
    pub rsi: f64,
    pub trend: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        (self.volume + self.rsi + self.trend).floor().clamp(0.0, 100.0) as u32
    }
}

pub fn breakdown(snapshot: &IndicatorSnapshot, turnover: f64, turnover_floor: f64) -> ScoreBreakdown {
    let ratio = if turnover_floor > 0.0 {
        turnover / turnover_floor
    } else {
        // No floor configured: any turnover saturates the term
        f64::INFINITY
    };
    let volume = (ratio * VOLUME_POINTS_PER_RATIO).clamp(0.0, VOLUME_CAP);

    let rsi = if snapshot.rsi >= RSI_SWEET_SPOT.0 && snapshot.rsi <= RSI_SWEET_SPOT.1 {
        RSI_SWEET_POINTS
    } else if snapshot.rsi > RSI_SWEET_SPOT.1 && snapshot.rsi <= RSI_WARM_MAX {
        RSI_WARM_POINTS
    } else {
        0.0
    };

    let trend = if snapshot.ma_fast > snapshot.ma_slow {
        TREND_UP_POINTS
    } else if snapshot.ma_fast > snapshot.ma_fast_prev {
        TREND_RISING_POINTS
    } else {
        0.0
    };

    ScoreBreakdown { volume, rsi, trend }
}

/// Composite 0-100 probability score.
pub fn score(snapshot: &IndicatorSnapshot, turnover: f64, turnover_floor: f64) -> u32 {
    breakdown(snapshot, turnover, turnover_floor).total()
}

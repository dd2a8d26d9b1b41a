use crate::config::Config;
use crate::core::indicators::IndicatorSnapshot;

/// Turnover is reported in millions of quote currency.
pub const TURNOVER_UNIT: f64 = 1_000_000.0;

pub fn turnover(price: f64, volume: f64) -> f64 {
    price * volume / TURNOVER_UNIT
}

/// Entry conditions for one instrument on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterVerdict {
    pub cross_ok: bool,
    pub rsi_ok: bool,
    pub turnover_ok: bool,
}

impl FilterVerdict {
    pub fn admits(&self) -> bool {
        self.cross_ok && self.rsi_ok && self.turnover_ok
    }
}

pub fn evaluate(snapshot: &IndicatorSnapshot, turnover_value: f64, cfg: &Config) -> FilterVerdict {
    FilterVerdict {
        cross_ok: !cfg.use_golden_cross || snapshot.is_golden_cross(),
        rsi_ok: snapshot.rsi <= cfg.rsi_threshold,
        turnover_ok: turnover_value >= cfg.turnover_floor,
    }
}

/// Low-RSI, heavy-turnover entry check.
pub fn admits(price: f64, volume: f64, snapshot: &IndicatorSnapshot, cfg: &Config) -> bool {
    evaluate(snapshot, turnover(price, volume), cfg).admits()
}

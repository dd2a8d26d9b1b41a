const TP_RANGE_MULTIPLE: f64 = 2.0;
const SL_RANGE_MULTIPLE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl Targets {
    /// Signed distances from `entry`, in percent.
    pub fn pct_from(&self, entry: f64) -> (f64, f64) {
        if entry == 0.0 {
            return (0.0, 0.0);
        }
        (
            (self.take_profit - entry) / entry * 100.0,
            (self.stop_loss - entry) / entry * 100.0,
        )
    }
}

/// Take the wider of a percentage band and a volatility band.
/// `tp_pct` / `sl_pct` are percents (2.0 = 2%).
pub fn calculate(price: f64, avg_range: f64, tp_pct: f64, sl_pct: f64) -> Targets {
    let tp_raw = f64::max(
        price * (1.0 + tp_pct / 100.0),
        price + avg_range * TP_RANGE_MULTIPLE,
    );
    let sl_raw = f64::min(
        price * (1.0 - sl_pct / 100.0),
        price - avg_range * SL_RANGE_MULTIPLE,
    );

    Targets {
        take_profit: round_price(tp_raw),
        stop_loss: round_price(sl_raw),
    }
}

/// Tick-like precision: integers from 1000 up, one decimal from 100, else two.
/// Halves round to even.
pub fn round_price(price: f64) -> f64 {
    if price >= 1000.0 {
        price.round_ties_even()
    } else if price >= 100.0 {
        (price * 10.0).round_ties_even() / 10.0
    } else {
        (price * 100.0).round_ties_even() / 100.0
    }
}

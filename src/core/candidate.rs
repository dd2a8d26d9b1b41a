use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::core::{filter, indicators, scoring, targets};
use crate::error::ScanError;
use crate::models::{CandleSeries, Instrument, Signal, SignalState};

/// Run one instrument through filter, scorer and target calculator.
///
/// `Ok(None)` means the data was fine but the entry conditions did not hold.
pub fn evaluate(
    instrument: &Instrument,
    price: f64,
    bars: &CandleSeries,
    cfg: &Config,
    now: DateTime<Utc>,
) -> Result<Option<Signal>, ScanError> {
    if bars.len() < indicators::MIN_BARS {
        return Err(ScanError::InsufficientBars {
            market: instrument.market.clone(),
            got: bars.len(),
            needed: indicators::MIN_BARS,
        });
    }
    if !bars.is_well_formed() || !price.is_finite() || price <= 0.0 {
        return Err(ScanError::MalformedBars(instrument.market.clone()));
    }

    let snapshot = indicators::compute(bars).ok_or_else(|| ScanError::InsufficientBars {
        market: instrument.market.clone(),
        got: bars.len(),
        needed: indicators::MIN_BARS,
    })?;
    if !snapshot.is_finite() {
        return Err(ScanError::Internal {
            market: instrument.market.clone(),
            reason: format!("non-finite indicators {:?}", snapshot),
        });
    }

    let volume = bars.last().map(|c| c.volume).unwrap_or(0.0);
    let turnover = filter::turnover(price, volume);
    let verdict = filter::evaluate(&snapshot, turnover, cfg);
    if !verdict.admits() {
        tracing::trace!(
            "[FILTER] {} rejected: cross={} rsi={:.1} turnover={:.1}",
            instrument.market,
            verdict.cross_ok,
            snapshot.rsi,
            turnover
        );
        return Ok(None);
    }

    let score = scoring::score(&snapshot, turnover, cfg.turnover_floor);
    if score < cfg.min_probability {
        tracing::debug!(
            "[SCORE] {} passed filter but scored {} < {}",
            instrument.market,
            score,
            cfg.min_probability
        );
        return Ok(None);
    }

    let levels = targets::calculate(
        price,
        snapshot.avg_range,
        cfg.take_profit_pct,
        cfg.stop_loss_pct,
    );
    let (take_profit_pct, stop_loss_pct) = levels.pct_from(price);

    Ok(Some(Signal {
        id: 0,
        market: instrument.market.clone(),
        symbol: instrument.symbol.clone(),
        detected_at: now,
        entry_price: price,
        rsi: snapshot.rsi,
        score,
        take_profit: levels.take_profit,
        stop_loss: levels.stop_loss,
        take_profit_pct,
        stop_loss_pct,
        state: SignalState::Watching,
        chart_url: instrument.chart_url(),
        created_at: now,
        exit_price: None,
        resolved_at: None,
    }))
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, SharedConfig};
use crate::core::candidate;
use crate::error::ScanError;
use crate::exchange::{MarketData, Universe};
use crate::models::Instrument;
use crate::notify::Notifier;
use crate::tracking::{Dashboard, SignalEvent, SignalStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub pass: u64,
    pub markets: usize,
    pub evaluated: usize,
    pub skipped: usize,
    /// Markets that hit an unexpected failure this pass.
    pub failed: usize,
    pub admitted: usize,
    pub resolved: usize,
    pub evicted: usize,
}

/// Sequential polling loop: one pass visits every watched market in turn.
pub struct Scanner {
    config: SharedConfig,
    market: Box<dyn MarketData>,
    notifier: Box<dyn Notifier>,
    store: SignalStore,
    universe: Universe,
    pass_count: u64,
    /// When set, used instead of Utc::now() (tests, replays)
    pub sim_time: Option<DateTime<Utc>>,
}

impl Scanner {
    pub async fn new(
        config: SharedConfig,
        market: Box<dyn MarketData>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let cfg = config.read().await;

        info!("{}", "=".repeat(60));
        info!("Whale scanner starting up");
        info!("Preset: {}", cfg.preset);
        info!(
            "Universe: top {} {} markets, min price {}, {} excluded",
            cfg.universe_size,
            cfg.quote_currency,
            cfg.min_price,
            cfg.blacklist.len()
        );
        info!(
            "Entry: RSI <= {} | turnover >= {}M | golden cross {} | min score {}",
            cfg.rsi_threshold,
            cfg.turnover_floor,
            if cfg.use_golden_cross { "required" } else { "optional" },
            cfg.min_probability
        );
        info!(
            "Targets: TP {}% / SL {}% | candles {} x {}",
            cfg.take_profit_pct, cfg.stop_loss_pct, cfg.candle_count, cfg.candle_interval
        );
        info!("{}", "=".repeat(60));

        let store = SignalStore::new(&cfg);
        drop(cfg);

        Self {
            config,
            market,
            notifier,
            store,
            universe: Universe::new(),
            pass_count: 0,
            sim_time: None,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.sim_time.unwrap_or_else(Utc::now)
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Scanner is now running. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.shutdown();
                    return Ok(());
                }
                _ = self.tick() => {}
            }
        }
    }

    async fn tick(&mut self) {
        let cfg = self.config.read().await.clone();

        let report = self.scan_pass(&cfg).await;
        info!(
            "Pass #{}: {} markets | {} evaluated, {} skipped, {} failed | +{} signals, {} resolved, {} evicted | watching {}",
            report.pass,
            report.markets,
            report.evaluated,
            report.skipped,
            report.failed,
            report.admitted,
            report.resolved,
            report.evicted,
            self.store.watching_count()
        );
        self.render();

        tokio::time::sleep(Duration::from_millis(cfg.scan_interval_ms)).await;
    }

    /// One full pass with the given configuration snapshot.
    ///
    /// A failing market is logged and counted, then the pass moves on to the
    /// next one. Eviction always runs at the end.
    pub async fn scan_pass(&mut self, cfg: &Config) -> PassReport {
        self.pass_count += 1;
        let mut report = PassReport {
            pass: self.pass_count,
            ..PassReport::default()
        };

        let now = self.now();
        let instruments = self
            .universe
            .refresh(self.market.as_mut(), cfg, now)
            .await
            .to_vec();
        report.markets = instruments.len();
        if instruments.is_empty() {
            debug!("No markets to scan this pass");
        }

        let prices = match self.market.current_prices(&instruments).await {
            Ok(p) => p,
            Err(e) => {
                debug!("Batch price fetch failed: {:#}", e);
                HashMap::new()
            }
        };

        let delay = Duration::from_millis(cfg.instrument_delay_ms);
        for (idx, instrument) in instruments.iter().enumerate() {
            let price = prices.get(&instrument.market).copied();
            match self.scan_instrument(instrument, price, cfg, &mut report).await {
                Ok(()) => report.evaluated += 1,
                Err(e) if e.is_data_unavailable() => {
                    debug!("Skip {}", e);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Unexpected failure on {}: {}", instrument.market, e);
                    report.failed += 1;
                }
            }

            if !delay.is_zero() && idx + 1 < instruments.len() {
                tokio::time::sleep(delay).await;
            }
        }

        report.evicted = self.store.evict_expired(self.now());
        report
    }

    async fn scan_instrument(
        &mut self,
        instrument: &Instrument,
        price: Option<f64>,
        cfg: &Config,
        report: &mut PassReport,
    ) -> Result<(), ScanError> {
        let price = price.ok_or_else(|| ScanError::MissingPrice(instrument.market.clone()))?;
        let now = self.now();

        if let Some(event) = self.store.resolve(&instrument.market, price, now) {
            let s = event.signal();
            info!(
                "Signal #{} {} {}: {} -> {} (TP {} / SL {})",
                s.id, s.symbol, s.state, s.entry_price, price, s.take_profit, s.stop_loss
            );
            report.resolved += 1;
            self.dispatch(&event).await;
        }

        let mut bars = self
            .market
            .recent_bars(instrument, cfg.candle_interval, cfg.candle_count)
            .await
            .map_err(|source| ScanError::Fetch {
                market: instrument.market.clone(),
                source,
            })?
            .ok_or_else(|| ScanError::InsufficientBars {
                market: instrument.market.clone(),
                got: 0,
                needed: crate::core::indicators::MIN_BARS,
            })?;
        bars.truncate_front(cfg.candle_count);

        let Some(candidate) = candidate::evaluate(instrument, price, &bars, cfg, now)? else {
            return Ok(());
        };

        match self.store.admit(candidate) {
            Ok(event) => {
                let s = event.signal();
                info!("{}", "=".repeat(60));
                info!("SIGNAL #{}: {} ({})", s.id, s.symbol, s.market);
                info!("  Entry: {}", s.entry_price);
                info!("  Take Profit: {} ({:+.1}%)", s.take_profit, s.take_profit_pct);
                info!("  Stop Loss: {} ({:+.1}%)", s.stop_loss, s.stop_loss_pct);
                info!("  RSI: {:.1} | Score: {}", s.rsi, s.score);
                info!("  Chart: {}", s.chart_url);
                info!("{}", "=".repeat(60));
                report.admitted += 1;
                self.dispatch(&event).await;
            }
            Err(rejection) => {
                debug!("Candidate dropped: {}", rejection);
            }
        }

        Ok(())
    }

    async fn dispatch(&self, event: &SignalEvent) {
        self.notifier.notify(&event.message()).await;
    }

    pub fn dashboard(&self) -> Dashboard {
        self.store.dashboard()
    }

    pub fn store(&self) -> &SignalStore {
        &self.store
    }

    pub fn watched(&self) -> &[Instrument] {
        self.universe.instruments()
    }

    /// Drop all signals, history and cooldowns.
    pub fn reset(&mut self) {
        info!("Clearing all signals and cooldowns");
        self.store.clear();
    }

    fn render(&self) {
        let dash = self.store.dashboard();
        if dash.active.is_empty() && dash.history.is_empty() {
            return;
        }

        debug!("--- Live tracking ---");
        for s in &dash.active {
            debug!(
                "  {:<8} {:<10} entry {} -> TP {} ({:+.1}%) SL {}",
                s.symbol, s.state, s.entry_price, s.take_profit, s.take_profit_pct, s.stop_loss
            );
        }
        debug!("--- History ---");
        for s in &dash.history {
            debug!(
                "  {} {:<8} {:>14} {}",
                s.detected_at.format("%H:%M:%S"),
                s.symbol,
                s.entry_price,
                s.state
            );
        }
    }

    fn shutdown(&self) {
        info!("Shutting down...");
        let dash = self.store.dashboard();
        info!(
            "Watching: {} | Active shown: {} | History: {}",
            self.store.watching_count(),
            dash.active.len(),
            self.store.history_len()
        );
        for s in &dash.active {
            info!("  {} {} @ {}", s.symbol, s.state, s.entry_price);
        }
        info!("Scanner stopped.");
    }
}

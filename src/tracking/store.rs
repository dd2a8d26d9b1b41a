use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use crate::config::Config;
use crate::models::Signal;
use crate::tracking::events::SignalEvent;

/// Entries shown in the compact live view.
pub const ACTIVE_DISPLAY: usize = 8;
/// Rows shown in the history table.
pub const HISTORY_DISPLAY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmitRejection {
    #[error("{market} cooling down for another {remaining_secs}s")]
    Cooldown { market: String, remaining_secs: i64 },

    #[error("{0} already has a watching signal")]
    AlreadyWatching(String),
}

/// Read-only view handed to the presentation side after each pass.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub active: Vec<Signal>,
    pub history: Vec<Signal>,
}

/// In-memory signal registry.
///
/// `active` holds signals still of interest (newest first): every WATCHING
/// signal plus resolved ones younger than the retention window. `history`
/// holds every admitted signal, newest first, bounded by `history_capacity`.
/// At most one WATCHING signal exists per market.
pub struct SignalStore {
    active: Vec<Signal>,
    history: VecDeque<Signal>,
    last_alert: HashMap<String, DateTime<Utc>>,
    signal_counter: u64,
    cooldown: Duration,
    retention_secs: i64,
    history_capacity: usize,
}

impl SignalStore {
    pub fn new(cfg: &Config) -> Self {
        Self::with_limits(cfg.cooldown_secs, cfg.retention_secs, cfg.history_capacity)
    }

    pub fn with_limits(cooldown_secs: i64, retention_secs: i64, history_capacity: usize) -> Self {
        Self {
            active: Vec::new(),
            history: VecDeque::new(),
            last_alert: HashMap::new(),
            signal_counter: 0,
            cooldown: Duration::seconds(cooldown_secs),
            retention_secs,
            history_capacity: history_capacity.max(1),
        }
    }

    /// Check the market's WATCHING signal against `price`. Take-profit is
    /// checked before stop-loss.
    pub fn resolve(&mut self, market: &str, price: f64, now: DateTime<Utc>) -> Option<SignalEvent> {
        let signal = self
            .active
            .iter_mut()
            .find(|s| s.market == market && s.is_watching())?;
        let outcome = signal.outcome_at(price)?;

        signal.state = outcome;
        signal.exit_price = Some(price);
        signal.resolved_at = Some(now);
        let resolved = signal.clone();

        if let Some(h) = self.history.iter_mut().find(|h| h.id == resolved.id) {
            *h = resolved.clone();
        }

        Some(SignalEvent::Resolved {
            signal: resolved,
            price,
        })
    }

    /// Register a fresh candidate, stamped at its `created_at`.
    pub fn admit(&mut self, mut signal: Signal) -> Result<SignalEvent, AdmitRejection> {
        let now = signal.created_at;

        if let Some(&last) = self.last_alert.get(&signal.market) {
            let elapsed = now - last;
            if elapsed <= self.cooldown {
                return Err(AdmitRejection::Cooldown {
                    market: signal.market,
                    remaining_secs: (self.cooldown - elapsed).num_seconds(),
                });
            }
        }

        if self
            .active
            .iter()
            .any(|s| s.market == signal.market && s.is_watching())
        {
            return Err(AdmitRejection::AlreadyWatching(signal.market));
        }

        self.signal_counter += 1;
        signal.id = self.signal_counter;

        self.last_alert.insert(signal.market.clone(), now);
        self.active.insert(0, signal.clone());
        self.history.push_front(signal.clone());
        self.history.truncate(self.history_capacity);

        Ok(SignalEvent::Admitted(signal))
    }

    /// Drop resolved signals older than the retention window from the active
    /// list. WATCHING signals stay regardless of age. Returns how many went.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.active.len();
        let retention_secs = self.retention_secs;
        self.active
            .retain(|s| s.is_watching() || s.age_secs(now) < retention_secs);
        before - self.active.len()
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            active: self.active.iter().take(ACTIVE_DISPLAY).cloned().collect(),
            history: self.history.iter().take(HISTORY_DISPLAY).cloned().collect(),
        }
    }

    /// Forget every signal and every cooldown.
    pub fn clear(&mut self) {
        self.active.clear();
        self.history.clear();
        self.last_alert.clear();
    }

    pub fn active(&self) -> &[Signal] {
        &self.active
    }

    pub fn history(&self) -> impl Iterator<Item = &Signal> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn watching_count(&self) -> usize {
        self.active.iter().filter(|s| s.is_watching()).count()
    }
}

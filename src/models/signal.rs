use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Watching,
    TargetHit,
    StopHit,
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalState::Watching => write!(f, "watching"),
            SignalState::TargetHit => write!(f, "target_hit"),
            SignalState::StopHit => write!(f, "stop_hit"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Assigned by the store on admission; 0 until then.
    pub id: u64,
    pub market: String,
    pub symbol: String,
    pub detected_at: DateTime<Utc>,
    pub entry_price: f64,
    pub rsi: f64,
    pub score: u32,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Signed distance from entry, in percent.
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub state: SignalState,
    pub chart_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Signal {
    pub fn is_watching(&self) -> bool {
        self.state == SignalState::Watching
    }

    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds()
    }

    /// Terminal state reached at `price`, if any. Take-profit wins ties.
    pub fn outcome_at(&self, price: f64) -> Option<SignalState> {
        if !self.is_watching() {
            return None;
        }
        if price >= self.take_profit {
            Some(SignalState::TargetHit)
        } else if price <= self.stop_loss {
            Some(SignalState::StopHit)
        } else {
            None
        }
    }
}

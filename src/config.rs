use crate::models::Timeframe;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<RwLock<Config>>;

/// One unit of the turnover-floor knob is 100 million in quote currency,
/// i.e. 100 turnover units (turnover is measured in millions).
const FLOOR_KNOB_TO_TURNOVER: f64 = 100.0;

const DEFAULT_BLACKLIST: &[&str] = &["KRW-BTC", "KRW-ETH", "KRW-XRP", "KRW-USDT"];

/// Market-regime presets. Each supplies defaults for the minimum price,
/// RSI ceiling and turnover floor knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Custom,
    QuietMarket,
    DipBuying,
    BullRun,
}

impl Preset {
    pub fn from_str_loose(s: &str) -> Option<Preset> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "custom" => Some(Preset::Custom),
            "quiet" | "quiet_market" => Some(Preset::QuietMarket),
            "dip" | "dip_buying" => Some(Preset::DipBuying),
            "bull" | "bull_run" => Some(Preset::BullRun),
            _ => None,
        }
    }

    /// (min price, RSI ceiling, turnover floor knob)
    pub fn defaults(&self) -> (f64, f64, f64) {
        match self {
            Preset::QuietMarket => (10.0, 45.0, 1.5),
            Preset::DipBuying => (100.0, 35.0, 3.0),
            Preset::BullRun => (1.0, 60.0, 10.0),
            Preset::Custom => (10.0, 40.0, 5.0),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Custom => write!(f, "custom"),
            Preset::QuietMarket => write!(f, "quiet_market"),
            Preset::DipBuying => write!(f, "dip_buying"),
            Preset::BullRun => write!(f, "bull_run"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Strategy
    pub preset: Preset,
    pub use_golden_cross: bool,
    pub rsi_threshold: f64,
    /// Minimum one-bar turnover, in millions of quote currency.
    pub turnover_floor: f64,
    pub min_probability: u32,

    // Targets (percent, e.g. 2.0 = 2%)
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,

    // Universe
    pub quote_currency: String,
    pub universe_size: usize,
    pub min_price: f64,
    pub blacklist: Vec<String>,
    pub universe_ttl_secs: u64,

    // Data
    pub candle_interval: Timeframe,
    pub candle_count: usize,
    pub request_timeout_secs: u64,

    // Loop pacing
    pub instrument_delay_ms: u64,
    pub scan_interval_ms: u64,

    // Lifecycle
    pub cooldown_secs: i64,
    pub retention_secs: i64,
    pub history_capacity: usize,

    // Notifications
    pub discord_webhook_url: Option<String>,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };
        let env_opt = |key: &str| -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        };

        let preset = env_opt("SCAN_PRESET")
            .and_then(|s| Preset::from_str_loose(&s))
            .unwrap_or_default();
        let (preset_min_price, preset_rsi, preset_floor) = preset.defaults();

        let floor_knob: f64 = env_opt("WHALE_FLOOR")
            .and_then(|s| s.parse().ok())
            .unwrap_or(preset_floor);

        let blacklist = match env_opt("EXCLUDE_MARKETS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        };

        Config {
            preset,
            use_golden_cross: env("USE_GOLDEN_CROSS", "false").to_lowercase() == "true",
            rsi_threshold: env_opt("RSI_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(preset_rsi)
                .clamp(10.0, 75.0),
            turnover_floor: floor_knob * FLOOR_KNOB_TO_TURNOVER,
            min_probability: env("MIN_PROBABILITY", "50").parse().unwrap_or(50).min(100),
            take_profit_pct: env("TAKE_PROFIT_PCT", "2.0")
                .parse()
                .unwrap_or(2.0_f64)
                .clamp(0.5, 10.0),
            stop_loss_pct: env("STOP_LOSS_PCT", "1.5")
                .parse()
                .unwrap_or(1.5_f64)
                .clamp(0.5, 5.0),
            quote_currency: env("QUOTE_CURRENCY", "KRW").to_uppercase(),
            universe_size: env("UNIVERSE_SIZE", "100").parse().unwrap_or(100),
            min_price: env_opt("MIN_PRICE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(preset_min_price),
            blacklist,
            universe_ttl_secs: env("UNIVERSE_TTL_SECS", "600").parse().unwrap_or(600),
            candle_interval: Timeframe::from_str_loose(&env("CANDLE_INTERVAL", "1m"))
                .unwrap_or(Timeframe::M1),
            candle_count: env("CANDLE_COUNT", "40").parse().unwrap_or(40),
            request_timeout_secs: env("REQUEST_TIMEOUT_SECS", "5").parse().unwrap_or(5),
            instrument_delay_ms: env("INSTRUMENT_DELAY_MS", "40").parse().unwrap_or(40),
            scan_interval_ms: env("SCAN_INTERVAL_MS", "1000").parse().unwrap_or(1000),
            cooldown_secs: 300,
            retention_secs: 600,
            history_capacity: env("HISTORY_CAPACITY", "1000").parse().unwrap_or(1000),
            discord_webhook_url: env_opt("DISCORD_WEBHOOK_URL"),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    pub fn is_blacklisted(&self, market: &str) -> bool {
        self.blacklist.iter().any(|b| b == market)
    }
}

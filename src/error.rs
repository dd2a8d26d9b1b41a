use thiserror::Error;

/// Why one instrument could not be evaluated during a pass.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no current price for {0}")]
    MissingPrice(String),

    #[error("{market}: {got} bars, need {needed}")]
    InsufficientBars {
        market: String,
        got: usize,
        needed: usize,
    },

    #[error("{0}: malformed bar data")]
    MalformedBars(String),

    #[error("{market}: fetch failed: {source}")]
    Fetch {
        market: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{market}: {reason}")]
    Internal { market: String, reason: String },
}

impl ScanError {
    /// Expected gaps in market data. The instrument is skipped for this pass
    /// and retried naturally on the next one.
    pub fn is_data_unavailable(&self) -> bool {
        !matches!(self, ScanError::Internal { .. })
    }
}

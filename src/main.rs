use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use whale_scanner::config::Config;
use whale_scanner::exchange::UpbitClient;
use whale_scanner::notify;
use whale_scanner::scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_level.to_lowercase()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let market = Box::new(UpbitClient::new(&cfg)?);
    let notifier = notify::from_config(&cfg);
    let shared_config = cfg.shared();

    let mut scanner = Scanner::new(shared_config, market, notifier).await;
    scanner.run().await?;

    Ok(())
}

pub mod discord;

pub use discord::DiscordWebhook;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;

/// Best-effort delivery. Implementations swallow their own failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Writes notifications to the log; used when no chat sink is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        info!("[NOTIFY] {}", text.replace('\n', " | "));
    }
}

/// Discord when a webhook URL is configured, the log otherwise.
pub fn from_config(cfg: &Config) -> Box<dyn Notifier> {
    match cfg.discord_webhook_url.as_deref() {
        Some(url) => match DiscordWebhook::new(url) {
            Ok(hook) => Box::new(hook),
            Err(e) => {
                tracing::warn!("Discord webhook disabled: {:#}", e);
                Box::new(LogNotifier)
            }
        },
        None => Box::new(LogNotifier),
    }
}

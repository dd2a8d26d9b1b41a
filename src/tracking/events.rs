use crate::models::{Signal, SignalState};

/// Lifecycle change worth telling someone about. Produced only after the
/// store has committed the change.
#[derive(Debug, Clone)]
pub enum SignalEvent {
    Admitted(Signal),
    Resolved { signal: Signal, price: f64 },
}

impl SignalEvent {
    pub fn signal(&self) -> &Signal {
        match self {
            SignalEvent::Admitted(s) => s,
            SignalEvent::Resolved { signal, .. } => signal,
        }
    }

    /// Chat-ready text.
    pub fn message(&self) -> String {
        match self {
            SignalEvent::Admitted(s) => format!(
                "🚨 **New signal: {}** (score {})\nEntry: {}\nTarget: {} ({:+.1}%) | Stop: {} ({:+.1}%)\n{}",
                s.symbol,
                s.score,
                group_thousands(s.entry_price),
                group_thousands(s.take_profit),
                s.take_profit_pct,
                group_thousands(s.stop_loss),
                s.stop_loss_pct,
                s.chart_url,
            ),
            SignalEvent::Resolved { signal, price } => {
                let (icon, label, what) = match signal.state {
                    SignalState::TargetHit => ("🎯", "TARGET", "take-profit reached"),
                    SignalState::StopHit => ("📉", "STOP", "stop-loss reached"),
                    SignalState::Watching => ("⏳", "WATCHING", "still open"),
                };
                format!(
                    "{} **[{}] {}** {}!\nEntry: {} -> Now: {}",
                    icon,
                    label,
                    signal.symbol,
                    what,
                    group_thousands(signal.entry_price),
                    group_thousands(*price),
                )
            }
        }
    }
}

/// `1234567.5` -> `1,234,567.5`. Integers print without a fraction.
pub fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let text = format!("{}", value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(&f);
    }
    out
}

//! Alert policy and dispatch.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use signal_core::traits::Notifier;
use signal_core::types::{IndicatorResult, SignalKind, SymbolSignal};
use tracing::{debug, info, warn};

/// Which signals are worth a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    pub notify_strong_buy: bool,
    pub notify_strong_sell: bool,
    /// Minimum strength (0-100) for an alert
    pub minimum_strength: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            notify_strong_buy: true,
            notify_strong_sell: false,
            minimum_strength: 80.0,
        }
    }
}

impl AlertPolicy {
    pub fn is_alertable(&self, result: &IndicatorResult) -> bool {
        let wanted = match result.signal {
            SignalKind::StrongBuy => self.notify_strong_buy,
            SignalKind::StrongSell => self.notify_strong_sell,
            SignalKind::Neutral => false,
        };
        wanted && result.strength >= self.minimum_strength
    }
}

/// Render an alert as Telegram-flavoured HTML.
pub fn format_alert(signal: &SymbolSignal) -> String {
    let r = &signal.result;
    let icon = match r.signal {
        SignalKind::StrongBuy => "🟢",
        SignalKind::StrongSell => "🔴",
        SignalKind::Neutral => "⚪",
    };
    format!(
        "{icon} <b>{label}: {symbol}</b>\n\
         Strength: <b>{strength:.0}%</b>\n\
         ADX: {adx:.2}\n\
         RSI: {rsi:.2}\n\
         EMA50: {ema50:.4}\n\
         EMA200: {ema200:.4}",
        label = r.signal.label(),
        symbol = signal.symbol,
        strength = r.strength,
        adx = r.adx,
        rsi = r.rsi,
        ema50 = r.ema50,
        ema200 = r.ema200,
    )
}

/// Sends one alert each time a symbol enters an alertable state.
///
/// A symbol that stays alertable across polls is not re-sent; once it
/// drops out, the next entry alerts again.
pub struct AlertDispatcher<N: Notifier> {
    notifier: N,
    policy: AlertPolicy,
    active: HashMap<String, SignalKind>,
}

impl<N: Notifier> AlertDispatcher<N> {
    pub fn new(notifier: N, policy: AlertPolicy) -> Self {
        Self {
            notifier,
            policy,
            active: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Process one poll's worth of results. Returns the symbols alerted.
    pub async fn process(&mut self, signals: &[SymbolSignal]) -> Vec<String> {
        let mut sent = Vec::new();

        for signal in signals {
            if !self.policy.is_alertable(&signal.result) {
                self.active.remove(&signal.symbol);
                continue;
            }
            if self.active.get(&signal.symbol) == Some(&signal.result.signal) {
                continue;
            }

            match self.notifier.send(&format_alert(signal)).await {
                Ok(true) => {
                    info!(
                        symbol = %signal.symbol,
                        signal = %signal.result.signal,
                        strength = signal.result.strength,
                        channel = self.notifier.name(),
                        "Alert sent"
                    );
                    self.active
                        .insert(signal.symbol.clone(), signal.result.signal);
                    sent.push(signal.symbol.clone());
                }
                Ok(false) => {
                    debug!(symbol = %signal.symbol, channel = self.notifier.name(), "No recipient, alert skipped");
                }
                Err(e) => {
                    warn!(symbol = %signal.symbol, channel = self.notifier.name(), error = %e, "Alert delivery failed");
                }
            }
        }

        sent
    }
}

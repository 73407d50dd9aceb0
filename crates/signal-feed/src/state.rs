//! Per-symbol connection state machine.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection state of one symbol's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedState {
    /// Opening, or waiting to reopen, the push stream
    #[default]
    Connecting,
    /// Push stream open
    Live,
    /// Retries exhausted; prices come from periodic REST polls
    DegradedPolling,
}

impl FeedState {
    pub fn is_live(&self) -> bool {
        matches!(self, FeedState::Live)
    }
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedState::Connecting => "connecting",
            FeedState::Live => "live",
            FeedState::DegradedPolling => "polling",
        };
        f.write_str(s)
    }
}

/// Retry and fallback timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `retry_interval * 2^n`
    pub retry_interval: Duration,
    /// REST poll period once degraded
    pub fallback_interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_interval: Duration::from_millis(2000),
            fallback_interval: Duration::from_millis(5000),
        }
    }
}

/// What to do after a connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectAction {
    /// Reconnect after the delay
    Retry(Duration),
    /// Stop reconnecting and poll
    Degrade,
}

/// Tracks retries for one feed.
///
/// `DegradedPolling` is terminal: the machine stays there until the feed
/// is torn down and created again.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    policy: ReconnectPolicy,
    state: FeedState,
    retries: u32,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: FeedState::Connecting,
            retries: 0,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// The push stream opened.
    pub fn on_connected(&mut self) {
        if self.state != FeedState::DegradedPolling {
            self.state = FeedState::Live;
            self.retries = 0;
        }
    }

    /// The push stream failed to open or dropped.
    pub fn on_failure(&mut self) -> ReconnectAction {
        if self.state == FeedState::DegradedPolling {
            return ReconnectAction::Degrade;
        }
        if self.retries < self.policy.max_retries {
            let delay = self
                .policy
                .retry_interval
                .saturating_mul(2u32.saturating_pow(self.retries));
            self.retries += 1;
            self.state = FeedState::Connecting;
            ReconnectAction::Retry(delay)
        } else {
            self.state = FeedState::DegradedPolling;
            ReconnectAction::Degrade
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_degrades() {
        let mut machine = ConnectionMachine::new(ReconnectPolicy::default());
        assert_eq!(machine.state(), FeedState::Connecting);

        let delays: Vec<ReconnectAction> = (0..6).map(|_| machine.on_failure()).collect();
        assert_eq!(
            delays,
            vec![
                ReconnectAction::Retry(Duration::from_millis(2000)),
                ReconnectAction::Retry(Duration::from_millis(4000)),
                ReconnectAction::Retry(Duration::from_millis(8000)),
                ReconnectAction::Retry(Duration::from_millis(16000)),
                ReconnectAction::Retry(Duration::from_millis(32000)),
                ReconnectAction::Degrade,
            ]
        );
        assert_eq!(machine.state(), FeedState::DegradedPolling);
    }

    #[test]
    fn test_connect_resets_retries() {
        let mut machine = ConnectionMachine::new(ReconnectPolicy::default());
        machine.on_failure();
        machine.on_failure();
        assert_eq!(machine.retries(), 2);

        machine.on_connected();
        assert_eq!(machine.state(), FeedState::Live);
        assert_eq!(machine.retries(), 0);

        // A drop from Live starts the backoff over
        assert_eq!(
            machine.on_failure(),
            ReconnectAction::Retry(Duration::from_millis(2000))
        );
        assert_eq!(machine.state(), FeedState::Connecting);
    }

    #[test]
    fn test_degraded_is_terminal() {
        let mut machine = ConnectionMachine::new(ReconnectPolicy {
            max_retries: 0,
            ..Default::default()
        });

        assert_eq!(machine.on_failure(), ReconnectAction::Degrade);
        machine.on_connected();
        assert_eq!(machine.state(), FeedState::DegradedPolling);
        assert_eq!(machine.on_failure(), ReconnectAction::Degrade);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(FeedState::DegradedPolling.to_string(), "polling");
        assert!(FeedState::Live.is_live());
        assert!(!FeedState::Connecting.is_live());
    }
}

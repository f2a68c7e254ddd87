use std::time::Duration;

use flightlink_frame::FrameConfig;

/// Default pause between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Channel behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Limits applied to inbound and outbound frames.
    pub frame: FrameConfig,
    /// Pause before each reconnect attempt.
    pub reconnect_delay: Duration,
    /// Give up after this many failed attempts. `None` retries until halted.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: None,
        }
    }
}

impl ChannelConfig {
    pub(crate) fn attempts_exhausted(&self, attempts: u32) -> bool {
        matches!(self.max_reconnect_attempts, Some(max) if attempts >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChannelConfig::default();
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_attempts, None);
        assert_eq!(config.frame.max_payload_size, 64);
    }

    #[test]
    fn attempt_limit() {
        let mut config = ChannelConfig::default();
        assert!(!config.attempts_exhausted(u32::MAX));

        config.max_reconnect_attempts = Some(2);
        assert!(!config.attempts_exhausted(1));
        assert!(config.attempts_exhausted(2));

        config.max_reconnect_attempts = Some(0);
        assert!(config.attempts_exhausted(0));
    }
}
